//! HTTP client library for the Gamma Exposure API.
//!
//! This crate provides a typed HTTP client for interacting with the gamma
//! exposure backend. It covers every REST endpoint: dataset upload and
//! management, strike selection, crossings and the gamma profile.
//!
//! # Example
//!
//! ```no_run
//! use gex_client::{ClientConfig, GexClient, ProfileQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gex_client::Error> {
//!     let client = GexClient::new(ClientConfig::default())?;
//!
//!     let payload = std::fs::read_to_string("snapshot.json").unwrap_or_default();
//!     let upload = client.upload_dataset(&payload).await?;
//!
//!     let profile = client
//!         .get_profile(&upload.dataset.id, &ProfileQuery::default())
//!         .await?;
//!     println!("Flip point: {:?}", profile.flip_point);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{ClientConfig, GexClient};
pub use error::Error;
pub use types::*;

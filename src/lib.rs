//! # Gamma Exposure Backend - REST API Server
//!
//! Computes **gamma exposure (GEX)** from option-chain snapshots, aggregated by
//! strike and expiration, and synthesizes a gamma profile across hypothetical
//! underlying prices to locate the **flip point**, the spot at which aggregate
//! dealer gamma changes sign.
//!
//! Built with [Axum](https://crates.io/crates/axum) for async HTTP handling and
//! provides OpenAPI/Swagger documentation via [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Two Input Schemas**: Legacy per-contract record arrays and single market
//!   snapshots with OCC-style encoded option identifiers, detected automatically.
//!
//! - **Strike Aggregation**: One point per (expiration, strike), puts negated,
//!   repeated records accumulated.
//!
//! - **Gamma Profile**: Black-Scholes re-pricing across spot levels with curves
//!   excluding the nearest and the nearest monthly expiration.
//!
//! - **Flip Detection**: Interpolated zero crossing of the profile and discrete
//!   strike crossings of filtered exposure.
//!
//! - **In-Memory Datasets**: Uploaded payloads are processed once and shared
//!   read-only across requests.
//!
//! ## Pipeline
//!
//! ```text
//! raw JSON ─► payload (detect + validate) ─► aggregate ─► ProcessedDataset
//!                                                            │
//!                      ┌─────────────────────────────────────┤
//!                      ▼                                     ▼
//!            filter (expirations + window)      profile (model + calendar)
//!                      │                                     │
//!                      ▼                                     ▼
//!            flip::strike_crossings               flip::interpolate_flip
//! ```
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`gex`] | Gamma exposure core: parsing, aggregation, profile, flip |
//! | [`api`] | Route handlers and router configuration |
//! | [`config`] | TOML configuration |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`models`] | Request/response DTOs with OpenAPI schemas |
//! | [`state`] | Application state management |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/stats` | Global statistics |
//! | GET | `/api/v1/datasets` | List datasets |
//! | POST | `/api/v1/datasets` | Upload a payload |
//! | GET | `/api/v1/datasets/{id}` | Dataset summary |
//! | DELETE | `/api/v1/datasets/{id}` | Delete dataset |
//! | GET | `/api/v1/datasets/{id}/expirations` | Sorted expirations |
//! | GET | `/api/v1/datasets/{id}/strikes` | Filtered strikes, highest first |
//! | GET | `/api/v1/datasets/{id}/crossings` | Strikes preceding sign changes |
//! | GET | `/api/v1/datasets/{id}/profile` | Gamma profile and flip point |
//!
//! ## Example Usage
//!
//! ```bash
//! # Start with a configuration file
//! GEX_CONFIG=config.toml cargo run
//!
//! # Upload a snapshot
//! curl -X POST http://localhost:8080/api/v1/datasets \
//!   -H "Content-Type: application/json" --data @snapshot.json
//!
//! # Strikes of one expiration between 90 and 110
//! curl "http://localhost:8080/api/v1/datasets/{id}/strikes?expirations=2025-10-31&min_strike=90&max_strike=110"
//!
//! # Profile with 50 levels as of a given date
//! curl "http://localhost:8080/api/v1/datasets/{id}/profile?levels=50&as_of=2025-10-27"
//! ```
//!
//! ## Library Usage
//!
//! ```rust
//! use gamma_exposure_backend::gex::{StrikeWindow, process_payload, select_strikes};
//!
//! let raw = r#"[{"contract": {"symbol": "ES", "strike": 100.0, "right": "C",
//!                             "lastTradeDate": "20251031", "multiplier": 50},
//!                "data": {"gamma": 0.001, "undPrice": 105.0, "openInterest": 10}}]"#;
//! let dataset = process_payload(raw).unwrap().dataset;
//! let window = StrikeWindow::new(90.0, 110.0).unwrap();
//! let points = select_strikes(&dataset, &dataset.expirations, window);
//! assert_eq!(points.len(), 1);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod gex;
pub mod models;
pub mod state;

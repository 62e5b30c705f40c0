//! Unit tests for error module.

use super::*;

#[test]
fn test_api_error_display() {
    let error = Error::Api {
        status: 400,
        code: "EMPTY_DATASET".to_string(),
        message: "Empty dataset".to_string(),
    };

    let display = format!("{}", error);
    assert!(display.contains("400"));
    assert!(display.contains("EMPTY_DATASET"));
    assert!(display.contains("Empty dataset"));
}

#[test]
fn test_not_found_error_display() {
    let error = Error::NotFound("Dataset not found: abc".to_string());

    let display = format!("{}", error);
    assert!(display.contains("Not found"));
    assert!(display.contains("abc"));
}

#[test]
fn test_invalid_url_error() {
    let error: Error = url::Url::parse("not a url").unwrap_err().into();
    assert!(format!("{}", error).contains("Invalid URL"));
}

#[test]
fn test_error_debug() {
    let error = Error::Api {
        status: 500,
        code: "INTERNAL_ERROR".to_string(),
        message: "Internal server error".to_string(),
    };

    let debug = format!("{:?}", error);
    assert!(debug.contains("Api"));
    assert!(debug.contains("500"));
}

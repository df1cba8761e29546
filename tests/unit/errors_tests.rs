/*!
 * Tests for error types and conversions
 */

use platecheck::errors::{AppError, LookupError, StorageError};

#[test]
fn test_storageError_write_shouldDisplayCorrectly() {
    let error = StorageError::Write("disk full".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Failed to write to storage"));
    assert!(display.contains("disk full"));
}

#[test]
fn test_lookupError_http_shouldDisplayStatusAndMessage() {
    let error = LookupError::Http {
        status_code: 503,
        message: "Maintenance".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("503"));
    assert!(display.contains("Maintenance"));
}

#[test]
fn test_lookupError_timeout_shouldDisplayMilliseconds() {
    let display = format!("{}", LookupError::Timeout(10_000));
    assert!(display.contains("10000 ms"));
}

#[test]
fn test_appError_fromStorageError_shouldWrapCorrectly() {
    let app_error: AppError = StorageError::Read("locked".to_string()).into();
    assert!(matches!(app_error, AppError::Storage(StorageError::Read(_))));
    assert!(format!("{}", app_error).contains("locked"));
}

#[test]
fn test_appError_fromLookupError_shouldWrapCorrectly() {
    let app_error: AppError = LookupError::Unreachable("refused".to_string()).into();
    assert!(matches!(app_error, AppError::Lookup(LookupError::Unreachable(_))));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldBecomeUnknown() {
    let app_error: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(app_error, AppError::Unknown(ref m) if m == "something odd"));
}

#[test]
fn test_userMessage_shouldDifferPerLookupFailureKind() {
    let unreachable = AppError::from(LookupError::Unreachable("x".to_string())).user_message();
    let timeout = AppError::from(LookupError::Timeout(5_000)).user_message();
    let http = AppError::from(LookupError::Http {
        status_code: 500,
        message: "Internal error".to_string(),
    })
    .user_message();
    let malformed = AppError::from(LookupError::MalformedResponse("x".to_string())).user_message();

    assert!(unreachable.contains("Cannot connect"));
    assert!(timeout.contains("5000 ms"));
    assert!(http.contains("500") && http.contains("Internal error"));
    assert!(malformed.contains("could not be read"));

    let all = [&unreachable, &timeout, &http, &malformed];
    for (i, a) in all.iter().enumerate() {
        for b in all.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_userMessage_withValidation_shouldShowMessageAsIs() {
    let error = AppError::Validation("Please enter a license plate".to_string());
    assert_eq!(error.user_message(), "Please enter a license plate");
}

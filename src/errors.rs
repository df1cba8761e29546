/*!
 * Error types for the platecheck application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by the local persistent store
#[derive(Error, Debug)]
pub enum StorageError {
    /// The database could not be opened or its schema could not be created.
    /// The application cannot proceed without a working store.
    #[error("Failed to initialize storage: {0}")]
    Initialization(String),

    /// A write (record, delete, clear) failed; existing rows are untouched
    #[error("Failed to write to storage: {0}")]
    Write(String),

    /// A read failed
    #[error("Failed to read from storage: {0}")]
    Read(String),
}

impl StorageError {
    pub(crate) fn initialization(error: anyhow::Error) -> Self {
        Self::Initialization(format!("{:#}", error))
    }

    pub(crate) fn write(error: anyhow::Error) -> Self {
        Self::Write(format!("{:#}", error))
    }

    pub(crate) fn read(error: anyhow::Error) -> Self {
        Self::Read(format!("{:#}", error))
    }
}

/// Errors that can occur when querying the remote violation service
#[derive(Error, Debug)]
pub enum LookupError {
    /// The service could not be reached (connection refused, DNS failure)
    #[error("Cannot reach the lookup service: {0}")]
    Unreachable(String),

    /// The service answered with a non-success HTTP status
    #[error("Lookup service responded with error: {status_code} - {message}")]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message from the service
        message: String,
    },

    /// The service did not answer within the configured wait
    #[error("Lookup request timed out after {0} ms")]
    Timeout(u64),

    /// The response body could not be parsed
    #[error("Failed to parse lookup response: {0}")]
    MalformedResponse(String),

    /// Any other transport failure
    #[error("Lookup request failed: {0}")]
    RequestFailed(String),

    /// The request URL could not be built from the configuration
    #[error("Invalid lookup endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the local store
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error from the remote lookup
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Short message suitable for showing to the user, distinct per failure kind
    pub fn user_message(&self) -> String {
        match self {
            AppError::Lookup(LookupError::Unreachable(_)) => {
                "Cannot connect to the lookup service. Check that the server is running and the API base URL is correct.".to_string()
            }
            AppError::Lookup(LookupError::Timeout(ms)) => {
                format!("The lookup service did not answer within {} ms. Please try again.", ms)
            }
            AppError::Lookup(LookupError::Http {
                status_code,
                message,
            }) => format!("The lookup service rejected the request ({}): {}", status_code, message),
            AppError::Lookup(LookupError::MalformedResponse(_)) => {
                "The lookup service returned a response that could not be read.".to_string()
            }
            AppError::Lookup(LookupError::InvalidEndpoint(endpoint)) => {
                format!("The lookup endpoint is misconfigured: {}", endpoint)
            }
            AppError::Lookup(LookupError::RequestFailed(_)) => {
                "An error occurred while searching. Please try again.".to_string()
            }
            AppError::Storage(StorageError::Initialization(_)) => {
                "The local database could not be opened.".to_string()
            }
            AppError::Storage(_) => "The search history could not be updated.".to_string(),
            AppError::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

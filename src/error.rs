//! Error handling for the webstacks application.
//! Defines the custom error type and result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// Custom error types for webstacks operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors that occur while serializing the template to JSON
    #[error("Serialization error: {0}.")]
    JsonError(#[from] serde_json::Error),

    /// Represents errors in loading or parsing a parameter defaults file
    #[error("Defaults file error: {0}.")]
    DefaultsError(String),
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}

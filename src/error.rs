//! Defines the application's primary error type `AppError` and a convenience `Result` alias.
//!
//! Uses the `thiserror` crate for ergonomic error definition and provides `From`
//! implementations to convert common external errors into `AppError` variants.
//! Errors that do not implement `Clone` are wrapped in `Arc` to allow `AppError` to be cloneable.

use std::sync::Arc;
use thiserror::Error;

/// The primary error enumeration for all application-specific errors.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// An option definition violates the flag naming rules of the parser.
    #[error("Invalid option definition: {0}")]
    InvalidOptionDefinition(String),

    /// Two registered options share a short or long name.
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),

    /// The argument vector was rejected by `clap`.
    #[error("Argument Error: {0}")]
    Parse(Arc<clap::Error>),

    /// A handler's `execute` returned an error.
    #[error("Option {option} failed: {message}")]
    Execution { option: String, message: String },

    /// Error originating from database operations (`sqlx`).
    #[error("Database Error: {0}")]
    Db(Arc<sqlx::Error>),

    /// An environment value is present but unusable.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error originating from user interaction prompts (`dialoguer`).
    #[error("Dialoguer Error: {0}")]
    Dialoguer(Arc<dialoguer::Error>),
}

/// A specialized `Result` type using the application's `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

// --- From implementations ---
// Arc is used for non-Clone error types.

impl From<clap::Error> for AppError {
    fn from(err: clap::Error) -> Self {
        AppError::Parse(Arc::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Db(Arc::new(err))
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        AppError::Dialoguer(Arc::new(err))
    }
}

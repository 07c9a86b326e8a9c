//! Unified error types for the school administration core.
//!
//! Primary writes surface these errors to the caller. Secondary effects (identifier
//! fallbacks, class counter adjustments, old avatar cleanup) log them and carry on.

use thiserror::Error;

/// Every failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The document store rejected or failed a call
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No student document with this id
    #[error("Student not found: {id}")]
    StudentNotFound {
        /// Document id that was looked up
        id: String,
    },

    /// No teacher document with this id
    #[error("Teacher not found: {id}")]
    TeacherNotFound {
        /// Document id that was looked up
        id: String,
    },

    /// No class document with this id
    #[error("Class not found: {id}")]
    ClassNotFound {
        /// Document id that was looked up
        id: String,
    },

    /// The account exists but has no profile document
    #[error("User profile not found for account {account_id}")]
    ProfileNotFound {
        /// Account the profile was expected for
        account_id: String,
    },

    /// Input rejected before anything was written
    #[error("Invalid input: {message}")]
    Validation {
        /// Which field and why
        message: String,
    },

    /// Credentials were wrong or the account could not be created
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Reason shown to the user
        message: String,
    },

    /// An operation needed a logged-in session and there was none
    #[error("No active session")]
    NotAuthenticated,

    /// A stored identifier did not match its expected pattern
    #[error("Malformed identifier: {value}")]
    InvalidIdentifier {
        /// The identifier as stored
        value: String,
    },

    /// The file bucket refused the request
    #[error("Storage error: {message}")]
    Storage {
        /// What went wrong
        message: String,
    },

    /// Upload exceeded the bucket's size limit
    #[error("File size must be less than {max} bytes (got {size})")]
    FileTooLarge {
        /// Size of the rejected upload
        size: u64,
        /// Configured maximum
        max: u64,
    },

    /// Upload content type is not an accepted image type
    #[error("Unsupported file type: {content_type}")]
    UnsupportedFileType {
        /// Content type of the rejected upload
        content_type: String,
    },

    /// Filesystem failure in the bucket or token file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON blob could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Password hashing or hash parsing failed
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Message from the hasher
        message: String,
    },
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

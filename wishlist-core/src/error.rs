use std::path::PathBuf;

use thiserror::Error;

pub type WishlistResult<T> = Result<T, WishlistError>;

#[derive(Error, Debug)]
pub enum WishlistError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read wishlist rows: {0}")]
    Csv(#[from] csv::Error),

    /// Stored row with the wrong number of fields
    #[error("wishlist row {line} has {found} fields, expected 4")]
    MalformedRow { line: u64, found: usize },

    #[error("request is not valid UTF-8")]
    InvalidEncoding,

    #[error("invalid json: {0}")]
    InvalidJson(String),

    #[error("request is missing a command")]
    MissingCommand,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("invalid {command} request: {message}")]
    InvalidRequest { command: String, message: String },

    #[error("field '{field}' {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Stored value that cannot be rendered as an amount
    #[error("card '{name}' has a non-numeric value '{value}'")]
    InvalidValue { name: String, value: String },
}

impl WishlistError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WishlistError::Io {
            path: path.into(),
            source,
        }
    }
}

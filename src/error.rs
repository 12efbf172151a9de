//! Error types and handling for the utilkit helpers
//! Author: kartik4091
//! Created: 2025-06-03 11:31:05 UTC

use std::{fmt, io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for utilkit operations
pub type Result<T> = StdResult<T, Error>;

/// Coarse classification every error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IoFailure,
    ParseFailure,
    ValidationFailure,
    NetworkFailure,
    TokenExpired,
    TokenMalformed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::IoFailure => "IOFailure",
            ErrorKind::ParseFailure => "ParseFailure",
            ErrorKind::ValidationFailure => "ValidationFailure",
            ErrorKind::NetworkFailure => "NetworkFailure",
            ErrorKind::TokenExpired => "TokenExpired",
            ErrorKind::TokenMalformed => "TokenMalformed",
        };
        write!(f, "{}", name)
    }
}

/// Core error type for utilkit operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Date/time parse error: {0}")]
    DateParseError(#[from] chrono::ParseError),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP Error: {status} - {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Token expired: {0}")]
    TokenExpired(String),

    #[error("Malformed token: {0}")]
    TokenMalformed(String),

    #[error("Unsupported token: {0}")]
    TokenUnsupported(String),

    #[error("Invalid JWT signature")]
    InvalidSignature,

    #[error("Cryptographic error: {0}")]
    CryptoError(#[from] openssl::error::ErrorStack),
}

impl Error {
    /// Maps the error onto its coarse kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IoError(_) | Error::ArchiveError(_) | Error::WatchError(_) => ErrorKind::IoFailure,
            Error::JsonError(e) if e.is_io() => ErrorKind::IoFailure,
            Error::JsonError(_)
            | Error::YamlError(_)
            | Error::DateParseError(_)
            | Error::ParseError(_) => ErrorKind::ParseFailure,
            Error::ValidationError(_)
            | Error::InvalidUrl(_)
            | Error::InvalidSignature
            | Error::CryptoError(_) => ErrorKind::ValidationFailure,
            Error::HttpStatus { .. } | Error::RequestError(_) | Error::NetworkError(_) => {
                ErrorKind::NetworkFailure
            }
            Error::TokenExpired(_) => ErrorKind::TokenExpired,
            Error::TokenMalformed(_) | Error::TokenUnsupported(_) => ErrorKind::TokenMalformed,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::ValidationError(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Error::ParseError(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Error::NetworkError(msg.into())
    }
}

//! Error taxonomy for token construction
//!
//! Every failure in this crate stems from caller-supplied input, never from
//! a transient condition, so nothing is retried or recovered internally.
//! Errors surface synchronously to the caller of the failing operation and
//! are never fatal to the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required string parameter was empty or absent.
    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),

    /// A parameter was malformed: a key that is not valid base64, or token
    /// text that does not follow the wire format.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

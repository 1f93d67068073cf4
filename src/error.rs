//! Error types for cursor tokens and connection resolution

use thiserror::Error;

use crate::entity::EntityKind;

/// A cursor token that could not be decoded.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid cursor format")]
    Encoding(#[from] base64::DecodeError),

    #[error("invalid cursor encoding")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid cursor: missing separator")]
    MissingSeparator,

    #[error("invalid cursor: unknown kind '{0}'")]
    UnknownKind(String),

    #[error("invalid cursor value '{0}'")]
    InvalidId(String),

    #[error("cursor points to a {found}, expected a {expected}")]
    KindMismatch {
        expected: EntityKind,
        found: EntityKind,
    },
}

/// Errors surfaced while resolving a connection page.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] sqlx::Error),

    #[error("invalid pagination arguments: {0}")]
    InvalidArguments(&'static str),
}

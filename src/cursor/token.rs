//! Opaque cursor tokens
//!
//! A token is the base64 encoding of `<kind>:<id>`. Decoding validates the
//! kind against the list being paged, so a post cursor can't page comments.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::entity::EntityKind;
use crate::error::TokenError;

/// Decoded cursor token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorToken {
    pub kind: EntityKind,
    pub id: i64,
}

impl CursorToken {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Encode as an opaque cursor string
    pub fn encode(&self) -> String {
        BASE64.encode(format!("{}:{}", self.kind, self.id))
    }

    /// Decode a cursor string of any kind
    pub fn decode(cursor: &str) -> Result<Self, TokenError> {
        let decoded = BASE64.decode(cursor.trim())?;
        let s = String::from_utf8(decoded)?;

        let (kind, id) = s.split_once(':').ok_or(TokenError::MissingSeparator)?;
        let kind =
            EntityKind::parse(kind).ok_or_else(|| TokenError::UnknownKind(kind.to_string()))?;
        let id = id
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| TokenError::InvalidId(id.to_string()))?;

        Ok(Self { kind, id })
    }
}

/// Encode a cursor for an item
pub fn encode_cursor(kind: EntityKind, id: i64) -> String {
    CursorToken::new(kind, id).encode()
}

/// Decode a cursor and check it belongs to `expected`, returning the identifier
pub fn decode_cursor(cursor: &str, expected: EntityKind) -> Result<i64, TokenError> {
    let token = CursorToken::decode(cursor)?;
    if token.kind != expected {
        return Err(TokenError::KindMismatch {
            expected,
            found: token.kind,
        });
    }
    Ok(token.id)
}

//! Identity newtypes shared across the CAT engine.
//!
//! The engine never generates user identities — those are owned by the
//! collaborator persisting sessions — but it does mint its own session ids
//! and expects item ids from the pool view, so those two get typed
//! constructors. `UserId` is a thin transparent wrapper kept mainly so
//! `SessionState` doesn't pass bare `String`s across its API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque item identifier, as vended by the item-pool view.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(s: impl Into<String>) -> Self {
        ItemId(s.into())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

/// Opaque caller-supplied user identifier. The engine never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// Session identifier minted by the engine at `begin_session`.
///
/// Format: `cat-YYYYMMDD-HHMMSS-XXXX` where `XXXX` is a base32 suffix drawn
/// from a UUIDv4, e.g. `cat-20260726-143022-a7xq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new session id from the current time.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let suffix = generate_base32_suffix();
        SessionId(format!(
            "cat-{}-{}-{}",
            now.format("%Y%m%d"),
            now.format("%H%M%S"),
            suffix
        ))
    }

    /// Parse and validate an existing session id string.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 24 {
            return None;
        }
        let bytes = s.as_bytes();
        if bytes.first() != Some(&b'c')
            || bytes.get(1) != Some(&b'a')
            || bytes.get(2) != Some(&b't')
            || bytes.get(3) != Some(&b'-')
            || bytes.get(12) != Some(&b'-')
            || bytes.get(19) != Some(&b'-')
        {
            return None;
        }
        let date = &s[4..12];
        let time = &s[13..19];
        let suffix = &s[20..24];
        if !date.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if !time.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if !suffix.chars().all(|c| matches!(c, 'a'..='z' | '2'..='7')) {
            return None;
        }
        Some(SessionId(s.to_string()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn generate_base32_suffix() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    let mut value = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32);
    value &= 0x000F_FFFF;
    let alphabet = b"abcdefghijklmnopqrstuvwxyz234567";
    let mut out = String::with_capacity(4);
    for shift in [15_u32, 10, 5, 0] {
        let idx = ((value >> shift) & 0x1F) as usize;
        out.push(alphabet[idx] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_format() {
        let sid = SessionId::new();
        assert!(sid.0.starts_with("cat-"));
        assert_eq!(sid.0.len(), 24);
        assert!(SessionId::parse(&sid.0).is_some());
    }

    #[test]
    fn session_id_rejects_malformed() {
        assert!(SessionId::parse("not-a-session-id").is_none());
        assert!(SessionId::parse("cat-20260726-143022-toolong!!").is_none());
    }

    #[test]
    fn item_id_display_roundtrips() {
        let id = ItemId::from("pattern-0042");
        assert_eq!(id.to_string(), "pattern-0042");
    }

    #[test]
    fn user_id_from_str() {
        let id: UserId = "u-123".into();
        assert_eq!(id.0, "u-123");
    }
}

//! Identifier newtypes for the two external id spaces
//!
//! - `ParticipantId` / `GroupId`: opaque 64-bit ids assigned by the messaging
//!   platform.
//! - `AccountId`: the affiliate account id a participant submits to prove
//!   eligibility. Purely numeric by contract; anything else is a format error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque participant id assigned by the messaging gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(i64);

impl ParticipantId {
    /// Create a new ParticipantId from a raw i64 value
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ParticipantId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ParticipantId> for i64 {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

/// Group (restricted chat) id assigned by the messaging gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(i64);

impl GroupId {
    /// Create a new GroupId from a raw i64 value
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External affiliate account id (a non-empty decimal string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Parse from submitted text; only non-empty, purely-numeric strings qualify
    pub fn parse(s: &str) -> Result<Self, AccountIdParseError> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AccountIdParseError::NotNumeric);
        }
        Ok(Self(s.to_string()))
    }

    /// View as &str
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = AccountIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountId::parse(s)
    }
}

/// Error when parsing an AccountId from submitted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccountIdParseError {
    #[error("account id must be a non-empty numeric string")]
    NotNumeric,
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Caller-assigned token identifier.
///
/// Unique across the registry and immutable once a record is stored. It also
/// names the token's asset files (`<id>.<ext>` and `<id>.jpg`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(u64);

impl TokenId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TokenId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenId {
    type Err = TypeError;

    /// Parse a decimal token id, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidTokenId(s.to_string()))
    }
}

/// A token record as submitted, before the store assigns `dateCreated`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewToken {
    pub token_id: TokenId,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub tx_hash: Option<String>,
    pub hashtags: Vec<String>,
    /// Relative filename of the full-resolution image, `<id><ext>`.
    pub image: Option<String>,
}

impl NewToken {
    pub fn new(token_id: TokenId) -> Self {
        Self {
            token_id,
            ..Self::default()
        }
    }

    /// Stamp the record with its creation time.
    pub fn into_record(self, date_created: DateTime<Utc>) -> TokenRecord {
        TokenRecord {
            token_id: self.token_id,
            name: self.name,
            artist: self.artist,
            hashtags: self.hashtags,
            description: self.description,
            owner: self.owner,
            tx_hash: self.tx_hash,
            image: self.image,
            date_created,
        }
    }
}

/// The persisted token record.
///
/// Records are immutable after creation. Optional text fields that were never
/// supplied are omitted from the JSON form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub token_id: TokenId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(with = "crate::timestamp::iso_millis")]
    pub date_created: DateTime<Utc>,
}

impl TokenRecord {
    /// Creation time as whole seconds since the UNIX epoch.
    pub fn created_at_secs(&self) -> i64 {
        self.date_created.timestamp()
    }
}

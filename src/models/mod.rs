//! Domain records
//!
//! Upstream key matching is case-tolerant only through the listed serde
//! aliases (camelCase, PascalCase, snake_case and all-lowercase). Any other
//! casing, e.g. `ACCESSTOKEN`, is treated as an unknown key and the field
//! keeps its default.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod email;
pub mod flight;

pub use email::*;
pub use flight::{Field, Flight};

use flight::null_as_default;

/// API user/key pair exchanged for a bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub key: String,
}

impl Credential {
    pub fn new<U: Into<String>, K: Into<String>>(user: U, key: K) -> Self {
        Self {
            user: user.into(),
            key: key.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user", &self.user)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Bearer token returned by the token endpoint
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    #[serde(
        rename = "accessToken",
        alias = "AccessToken",
        alias = "access_token",
        alias = "accesstoken",
        deserialize_with = "null_as_default"
    )]
    pub access_token: String,

    #[serde(
        rename = "expiresInSeconds",
        alias = "ExpiresInSeconds",
        alias = "expires_in_seconds",
        alias = "expiresinseconds",
        deserialize_with = "null_as_default"
    )]
    pub expires_in_seconds: i64,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("expires_in_seconds", &self.expires_in_seconds)
            .finish()
    }
}

/// Airport scope for one pass of the job
///
/// The hour window is inclusive and applies to the local schedule time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    #[serde(rename = "Code", alias = "code")]
    pub code: String,
    #[serde(
        rename = "MinHour",
        alias = "minHour",
        alias = "minhour",
        alias = "min_hour",
        default
    )]
    pub min_hour: u32,
    #[serde(
        rename = "MaxHour",
        alias = "maxHour",
        alias = "maxhour",
        alias = "max_hour",
        default = "default_max_hour"
    )]
    pub max_hour: u32,
}

fn default_max_hour() -> u32 {
    23
}

impl Airport {
    pub fn new<C: Into<String>>(code: C, min_hour: u32, max_hour: u32) -> Self {
        Self {
            code: code.into(),
            min_hour,
            max_hour,
        }
    }

    /// Whether `hour` (0-23) falls inside this airport's window
    pub fn accepts_hour(&self, hour: u32) -> bool {
        (self.min_hour..=self.max_hour).contains(&hour)
    }
}

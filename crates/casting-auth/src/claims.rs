//! Claims carried by a verified bearer token.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `aud` claim: a single audience or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(a) => a == audience,
            Audience::Multiple(list) => list.iter().any(|a| a == audience),
        }
    }
}

impl Default for Audience {
    fn default() -> Self {
        Audience::Multiple(Vec::new())
    }
}

impl From<&str> for Audience {
    fn from(value: &str) -> Self {
        Audience::Single(value.to_string())
    }
}

/// Decoded token payload.
///
/// `permissions` is kept as an `Option` so that a token with no
/// `permissions` claim at all can be told apart from one granting nothing.
/// Registered claims default when absent; presence of `exp`, `iss` and `aud`
/// is enforced by the verifier, not by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub iss: String,

    #[serde(default)]
    pub sub: String,

    #[serde(default)]
    pub aud: Audience,

    #[serde(default)]
    pub exp: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    /// Provider-specific claims (`azp`, `scope`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Build claims for a subject expiring at `exp` (seconds since epoch).
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        audience: impl Into<String>,
        exp: u64,
    ) -> Self {
        Self {
            iss: issuer.into(),
            sub: subject.into(),
            aud: Audience::Single(audience.into()),
            exp,
            iat: None,
            permissions: None,
            extra: Map::new(),
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_issued_at(mut self, iat: u64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Granted permissions in token order; empty when the claim is absent.
    pub fn permissions(&self) -> &[String] {
        self.permissions.as_deref().unwrap_or_default()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions().iter().any(|p| p == permission)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.exp).ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }
}

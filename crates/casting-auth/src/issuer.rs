//! Development token minting.
//!
//! Real tokens come from the identity provider. This signs RS256 tokens with
//! a local key so the service can be exercised without one.

use crate::claims::Claims;
use crate::error::SetupError;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::time::Duration;

pub struct TokenIssuer {
    key: EncodingKey,
    kid: String,
    issuer: String,
    audience: String,
}

impl TokenIssuer {
    /// Create an issuer from a PEM-encoded RSA private key (PKCS#1 or PKCS#8).
    pub fn from_rsa_pem(
        pem: &[u8],
        kid: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, SetupError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(|e| SetupError::InvalidKey(e.to_string()))?;
        Ok(Self {
            key,
            kid: kid.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        })
    }

    /// Claims for `subject` granting `permissions`, valid for `ttl` from now.
    pub fn claims<I, S>(&self, subject: &str, permissions: I, ttl: Duration) -> Claims
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now().timestamp().max(0) as u64;
        Claims::new(&self.issuer, subject, &self.audience, now + ttl.as_secs())
            .with_issued_at(now)
            .with_permissions(permissions)
    }

    pub fn mint<I, S>(&self, subject: &str, permissions: I, ttl: Duration) -> Result<String, SetupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mint_claims(&self.claims(subject, permissions, ttl))
    }

    /// Sign arbitrary claims with this issuer's key and key id.
    pub fn mint_claims(&self, claims: &Claims) -> Result<String, SetupError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.kid.clone());
        encode(&header, claims, &self.key).map_err(|e| SetupError::Signing(e.to_string()))
    }
}

//! Token commands.
//!
//! `casting token mint` - Sign a development token for a role preset.
//! `casting token verify` - Verify a token against a local key set.

use anyhow::Context;
use casting_auth::{
    Authorizer, KeySetCache, StaticKeySource, TokenIssuer, TokenVerifier, VerifierSettings,
};
use casting_core::RolePreset;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Options for `casting token mint`.
#[derive(Debug)]
pub struct MintOptions {
    pub key: PathBuf,
    pub kid: String,
    pub role: RolePreset,
    pub issuer: String,
    pub audience: String,
    pub subject: Option<String>,
    pub ttl: String,
}

/// Parse a TTL such as "1h", "30m" or "1h 30m".
pub fn parse_ttl(s: &str) -> anyhow::Result<Duration> {
    let ttl = humantime::parse_duration(s.trim())
        .with_context(|| format!("invalid ttl '{s}' (expected e.g. 1h, 30m, 7d)"))?;
    if ttl.as_secs() == 0 {
        anyhow::bail!("ttl must be at least one second");
    }
    Ok(ttl)
}

fn read_key(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read signing key {}", path.display()))
}

/// Mint a token and return it.
pub fn mint(opts: MintOptions) -> anyhow::Result<String> {
    let ttl = parse_ttl(&opts.ttl)?;
    let pem = read_key(&opts.key)?;
    let issuer = TokenIssuer::from_rsa_pem(&pem, &opts.kid, &opts.issuer, &opts.audience)
        .context("failed to load signing key (expected an RSA private key in PEM form)")?;

    let subject = opts
        .subject
        .unwrap_or_else(|| format!("dev|{}", opts.role.name()));

    let token = issuer.mint(&subject, opts.role.permission_strings(), ttl)?;
    tracing::debug!(role = %opts.role, subject = %subject, ttl = ?ttl, "minted token");
    Ok(token)
}

/// Verify `token` against the JWKS in `jwks`, optionally requiring a
/// permission. Prints the claims as JSON.
pub async fn verify(
    token: &str,
    jwks: &Path,
    issuer: &str,
    audience: &str,
    permission: Option<&str>,
) -> anyhow::Result<()> {
    let source = StaticKeySource::from_file(jwks)
        .with_context(|| format!("failed to load key set {}", jwks.display()))?;
    let keys = KeySetCache::new(Arc::new(source), Duration::from_secs(60));
    let verifier = TokenVerifier::new(VerifierSettings::new(issuer, audience), Arc::new(keys));

    let claims = match permission {
        Some(required) => {
            let header = format!("Bearer {}", token.trim());
            Authorizer::new(verifier)
                .authorize(required, Some(&header))
                .await
        }
        None => verifier.verify(token.trim()).await,
    }
    .map_err(|e| anyhow::anyhow!("{} ({})", e.description(), e.code()))?;

    println!("{}", serde_json::to_string_pretty(&claims)?);
    if let Some(exp) = claims.expires_at() {
        eprintln!("valid until {}", exp.to_rfc3339());
    }
    Ok(())
}

//! Bearer-token verification settings.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where tokens come from and how their signing keys are found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `casting.eu.auth0.com`.
    #[serde(default)]
    pub domain: String,

    /// Expected `iss` claim. Defaults to `https://{domain}/`.
    #[serde(default)]
    pub issuer: Option<String>,

    /// Expected `aud` claim.
    #[serde(default)]
    pub audience: String,

    /// Accepted signing algorithms. Only asymmetric algorithms are honoured.
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<String>,

    /// Key-set endpoint. Defaults to `https://{domain}/.well-known/jwks.json`.
    #[serde(default)]
    pub jwks_url: Option<String>,

    /// Local key-set file; when set, no network fetch is made.
    #[serde(default)]
    pub jwks_file: Option<PathBuf>,

    #[serde(default = "default_jwks_cache_ttl_secs")]
    pub jwks_cache_ttl_secs: u64,

    #[serde(default = "default_jwks_fetch_timeout_ms")]
    pub jwks_fetch_timeout_ms: u64,

    /// Minimum interval between key-set fetches triggered by unknown key ids.
    #[serde(default = "default_jwks_min_refresh_secs")]
    pub jwks_min_refresh_secs: u64,

    /// Clock skew tolerated when checking `exp`.
    #[serde(default)]
    pub leeway_secs: u64,
}

fn default_algorithms() -> Vec<String> {
    vec!["RS256".to_string()]
}

fn default_jwks_cache_ttl_secs() -> u64 {
    600
}

fn default_jwks_fetch_timeout_ms() -> u64 {
    5000
}

fn default_jwks_min_refresh_secs() -> u64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            issuer: None,
            audience: String::new(),
            algorithms: default_algorithms(),
            jwks_url: None,
            jwks_file: None,
            jwks_cache_ttl_secs: default_jwks_cache_ttl_secs(),
            jwks_fetch_timeout_ms: default_jwks_fetch_timeout_ms(),
            jwks_min_refresh_secs: default_jwks_min_refresh_secs(),
            leeway_secs: 0,
        }
    }
}

impl AuthConfig {
    /// Domain without scheme or trailing slash.
    pub fn bare_domain(&self) -> &str {
        let d = self.domain.trim();
        let d = d
            .strip_prefix("https://")
            .or_else(|| d.strip_prefix("http://"))
            .unwrap_or(d);
        d.trim_end_matches('/')
    }

    pub fn issuer(&self) -> String {
        match &self.issuer {
            Some(iss) if !iss.trim().is_empty() => iss.trim().to_string(),
            _ => format!("https://{}/", self.bare_domain()),
        }
    }

    pub fn jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => format!("https://{}/.well-known/jwks.json", self.bare_domain()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audience.trim().is_empty() {
            return Err(ConfigError::Config(
                "auth.audience is empty (set it in the config file or API_AUDIENCE)".to_string(),
            ));
        }
        let has_issuer = self.issuer.as_deref().is_some_and(|i| !i.trim().is_empty());
        if !has_issuer && self.bare_domain().is_empty() {
            return Err(ConfigError::Config(
                "auth.domain or auth.issuer must be set (or AUTH0_DOMAIN)".to_string(),
            ));
        }
        let has_jwks_url = self.jwks_url.as_deref().is_some_and(|u| !u.trim().is_empty());
        if self.jwks_file.is_none() && !has_jwks_url && self.bare_domain().is_empty() {
            return Err(ConfigError::Config(
                "no key source: set auth.domain, auth.jwks_url or auth.jwks_file".to_string(),
            ));
        }
        if self.algorithms.is_empty() {
            return Err(ConfigError::Config("auth.algorithms is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_normalization() {
        let cfg = AuthConfig {
            domain: "https://casting.auth0.com/".into(),
            ..Default::default()
        };
        assert_eq!(cfg.bare_domain(), "casting.auth0.com");
        assert_eq!(cfg.issuer(), "https://casting.auth0.com/");
    }

    #[test]
    fn test_explicit_issuer_and_jwks_file() {
        let cfg = AuthConfig {
            issuer: Some("https://issuer.test/".into()),
            audience: "agency".into(),
            jwks_file: Some(PathBuf::from("jwks.json")),
            ..Default::default()
        };
        assert_eq!(cfg.issuer(), "https://issuer.test/");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_missing_issuer_is_rejected() {
        let cfg = AuthConfig {
            audience: "agency".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}

//! # casting-auth
//!
//! Bearer-token verification and permission checks.
//!
//! A request is authorized in one linear pass:
//!
//! 1. [`bearer::bearer_token`] pulls the token out of the `Authorization` header.
//! 2. [`TokenVerifier`] checks the algorithm, finds the signing key in the
//!    cached key set, verifies the signature and the `exp`/`iss`/`aud` claims.
//! 3. [`scope::check_permission`] checks the required permission string
//!    against the token's `permissions` claim.
//!
//! Nothing is kept between requests except the [`KeySetCache`].

pub mod bearer;
pub mod claims;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod scope;
pub mod token;

pub use claims::{Audience, Claims};
pub use error::{AuthError, KeySetError, SetupError};
pub use issuer::TokenIssuer;
pub use keys::{HttpKeySource, KeySetCache, KeySource, StaticKeySource};
pub use token::{TokenVerifier, VerifierSettings};

use casting_core::AuthConfig;
use std::sync::Arc;
use std::time::Duration;

/// Entry point used by the HTTP layer.
pub struct Authorizer {
    verifier: TokenVerifier,
}

impl Authorizer {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Build the verifier described by `[auth]`. A local `jwks_file` takes
    /// precedence over the issuer's endpoint.
    pub fn from_config(config: &AuthConfig) -> Result<Self, SetupError> {
        let settings = VerifierSettings::from_config(config)?;

        let source: Arc<dyn KeySource> = match &config.jwks_file {
            Some(path) => Arc::new(StaticKeySource::from_file(path)?),
            None => Arc::new(HttpKeySource::new(
                config.jwks_url(),
                Duration::from_millis(config.jwks_fetch_timeout_ms),
            )?),
        };

        tracing::info!(
            issuer = %settings.issuer,
            audience = %settings.audience,
            keys = %source.describe(),
            "token verification configured"
        );

        let cache = KeySetCache::new(source, Duration::from_secs(config.jwks_cache_ttl_secs))
            .with_min_refresh(Duration::from_secs(config.jwks_min_refresh_secs));
        Ok(Self::new(TokenVerifier::new(settings, Arc::new(cache))))
    }

    /// Warm the key set cache.
    pub async fn preload(&self) -> Result<usize, KeySetError> {
        self.verifier.keys().preload().await
    }

    /// Authorize a request carrying `authorization` for `required`.
    pub async fn authorize(
        &self,
        required: &str,
        authorization: Option<&str>,
    ) -> Result<Claims, AuthError> {
        let result = async {
            let token = bearer::bearer_token(authorization)?;
            let claims = self.verifier.verify(token).await?;
            scope::check_permission(claims, required)
        }
        .await;

        if let Err(e) = &result {
            tracing::debug!(code = e.code(), required, "request not authorized");
        }
        result
    }
}

//! Bearer token verification.

use crate::claims::Claims;
use crate::error::{
    ALGORITHM_NOT_PERMITTED, AUTHORIZATION_MALFORMED, AuthError, INCORRECT_CLAIMS,
    SIGNATURE_NOT_VERIFIED, SetupError,
};
use crate::keys::KeySetCache;
use casting_core::AuthConfig;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::KeyAlgorithm;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use std::str::FromStr;
use std::sync::Arc;

/// What a token must satisfy to be accepted.
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    pub issuer: String,
    pub audience: String,
    pub algorithms: Vec<Algorithm>,
    pub leeway_secs: u64,
}

impl VerifierSettings {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            leeway_secs: 0,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, SetupError> {
        let algorithms = config
            .algorithms
            .iter()
            .map(|name| parse_algorithm(name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            issuer: config.issuer(),
            audience: config.audience.trim().to_string(),
            algorithms,
            leeway_secs: config.leeway_secs,
        })
    }
}

/// Parse a configured algorithm name, refusing the HMAC family.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, SetupError> {
    let alg = Algorithm::from_str(name.trim())
        .map_err(|_| SetupError::UnsupportedAlgorithm(name.to_string()))?;
    if is_symmetric(alg) {
        return Err(SetupError::SymmetricAlgorithm(name.to_string()));
    }
    Ok(alg)
}

fn is_symmetric(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

/// Whether a key published with `key_alg` may verify a token signed with `alg`.
fn key_allows(key_alg: &KeyAlgorithm, alg: Algorithm) -> bool {
    matches!(
        (key_alg, alg),
        (KeyAlgorithm::RS256, Algorithm::RS256)
            | (KeyAlgorithm::RS384, Algorithm::RS384)
            | (KeyAlgorithm::RS512, Algorithm::RS512)
            | (KeyAlgorithm::PS256, Algorithm::PS256)
            | (KeyAlgorithm::PS384, Algorithm::PS384)
            | (KeyAlgorithm::PS512, Algorithm::PS512)
            | (KeyAlgorithm::ES256, Algorithm::ES256)
            | (KeyAlgorithm::ES384, Algorithm::ES384)
            | (KeyAlgorithm::EdDSA, Algorithm::EdDSA)
    )
}

/// Verifies signature, expiry, issuer and audience of bearer tokens.
pub struct TokenVerifier {
    settings: VerifierSettings,
    keys: Arc<KeySetCache>,
}

impl TokenVerifier {
    pub fn new(settings: VerifierSettings, keys: Arc<KeySetCache>) -> Self {
        Self { settings, keys }
    }

    pub fn keys(&self) -> &Arc<KeySetCache> {
        &self.keys
    }

    /// Verify `token` and return its claims.
    ///
    /// The algorithm is checked against the accepted list before any key
    /// lookup, so a token cannot pick HMAC and have a public key used as the
    /// secret.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        let kid = match header.kid.as_deref() {
            Some(kid) if !kid.is_empty() => kid,
            _ => return Err(AuthError::MalformedHeader(AUTHORIZATION_MALFORMED)),
        };

        let alg = header.alg;
        if is_symmetric(alg) || !self.settings.algorithms.contains(&alg) {
            tracing::warn!(alg = ?alg, "token uses an algorithm that is not accepted");
            return Err(AuthError::BadSignature(ALGORITHM_NOT_PERMITTED));
        }

        let jwk = self.keys.key(kid).await?;
        if let Some(key_alg) = jwk.common.key_algorithm.as_ref() {
            if !key_allows(key_alg, alg) {
                tracing::warn!(kid = %kid, alg = ?alg, "token algorithm does not match its key");
                return Err(AuthError::BadSignature(ALGORITHM_NOT_PERMITTED));
            }
        }

        let key = DecodingKey::from_jwk(&jwk).map_err(|e| {
            tracing::warn!(kid = %kid, error = %e, "unusable key in key set");
            AuthError::UnknownKey
        })?;

        let mut validation = Validation::new(alg);
        validation.set_issuer(&[self.settings.issuer.as_str()]);
        validation.set_audience(&[self.settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = self.settings.leeway_secs;

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| map_decode_error(e.kind()))?;
        Ok(data.claims)
    }
}

fn map_decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims(INCORRECT_CLAIMS),
        ErrorKind::InvalidSignature | ErrorKind::Crypto(_) => {
            AuthError::BadSignature(SIGNATURE_NOT_VERIFIED)
        }
        ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
            AuthError::BadSignature(ALGORITHM_NOT_PERMITTED)
        }
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidKeyFormat => {
            AuthError::UnknownKey
        }
        _ => AuthError::MalformedToken,
    }
}

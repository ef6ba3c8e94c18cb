//! Error types for token verification.

use thiserror::Error;

pub const HEADER_EXPECTED: &str = "Authorization header is expected.";
pub const MUST_START_WITH_BEARER: &str = "Authorization header must start with \"Bearer\".";
pub const TOKEN_NOT_FOUND: &str = "Token not found.";
pub const MUST_BE_BEARER_TOKEN: &str = "Authorization header must be bearer token.";
pub const AUTHORIZATION_MALFORMED: &str = "Authorization malformed.";
pub const UNABLE_TO_PARSE: &str = "Unable to parse authentication token.";
pub const KEY_NOT_FOUND: &str = "Unable to find the appropriate key.";
pub const SIGNATURE_NOT_VERIFIED: &str = "Token signature could not be verified.";
pub const ALGORITHM_NOT_PERMITTED: &str = "Token algorithm is not permitted.";
pub const TOKEN_EXPIRED: &str = "Token expired.";
pub const INCORRECT_CLAIMS: &str = "Incorrect claims. Please, check the audience and issuer.";
pub const PERMISSIONS_NOT_INCLUDED: &str = "Permissions not included in JWT.";
pub const PERMISSION_NOT_FOUND: &str = "Permission not found.";

/// Why a request was refused.
///
/// Every variant except [`AuthError::Forbidden`] means the caller is not
/// authenticated (401); `Forbidden` means authenticated but lacking the
/// route's permission (403). All are terminal for the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header.
    #[error("authorization header is missing")]
    MissingToken,

    /// The header is not `Bearer <token>`, or the token header lacks a key id.
    #[error("malformed authorization header: {0}")]
    MalformedHeader(&'static str),

    /// The token is not three base64url segments of JSON.
    #[error("malformed token")]
    MalformedToken,

    /// No key in the issuer's key set matches the token's key id.
    #[error("signing key not found")]
    UnknownKey,

    /// Signature did not verify, or the declared algorithm is not accepted.
    #[error("bad signature: {0}")]
    BadSignature(&'static str),

    /// `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// Issuer, audience or required claims do not match.
    #[error("invalid claims: {0}")]
    InvalidClaims(&'static str),

    /// The token is valid but does not grant the required permission.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
}

impl AuthError {
    /// Machine-readable code carried in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "authorization_header_missing",
            AuthError::MalformedHeader(_) | AuthError::MalformedToken | AuthError::UnknownKey => {
                "invalid_header"
            }
            AuthError::BadSignature(_) => "invalid_signature",
            AuthError::Expired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::Forbidden(_) => "unauthorized",
        }
    }

    /// Human-readable description carried in error bodies.
    pub fn description(&self) -> &'static str {
        match self {
            AuthError::MissingToken => HEADER_EXPECTED,
            AuthError::MalformedHeader(d)
            | AuthError::BadSignature(d)
            | AuthError::InvalidClaims(d)
            | AuthError::Forbidden(d) => *d,
            AuthError::MalformedToken => UNABLE_TO_PARSE,
            AuthError::UnknownKey => KEY_NOT_FOUND,
            AuthError::Expired => TOKEN_EXPIRED,
        }
    }

    /// HTTP status this failure maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Forbidden(_) => 403,
            _ => 401,
        }
    }
}

/// Failure to obtain or parse the issuer's key set.
#[derive(Debug, Error)]
pub enum KeySetError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The request failed (connect error, timeout, ...).
    #[error("failed to fetch key set from {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The endpoint answered with a non-success status.
    #[error("key set endpoint {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body is not a JWKS document.
    #[error("failed to parse key set: {0}")]
    Parse(String),

    /// IO error (reading a local key-set file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors building the verification pipeline or minting tokens.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("symmetric algorithm '{0}' is not accepted; configure an asymmetric one")]
    SymmetricAlgorithm(String),

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error(transparent)]
    KeySet(#[from] KeySetError),
}

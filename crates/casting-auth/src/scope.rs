//! Permission checks on verified claims.

use crate::claims::Claims;
use crate::error::{AuthError, PERMISSION_NOT_FOUND, PERMISSIONS_NOT_INCLUDED};

/// Succeed with `claims` when they grant `required`.
///
/// Plain set membership: no hierarchy, no wildcards.
pub fn check_permission(claims: Claims, required: &str) -> Result<Claims, AuthError> {
    let Some(granted) = claims.permissions.as_ref() else {
        return Err(AuthError::InvalidClaims(PERMISSIONS_NOT_INCLUDED));
    };

    if granted.iter().any(|p| p == required) {
        Ok(claims)
    } else {
        tracing::debug!(
            subject = %claims.sub,
            required,
            "permission not granted"
        );
        Err(AuthError::Forbidden(PERMISSION_NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims::new("https://issuer.test/", "auth0|1", "casting", 4102444800)
    }

    #[test]
    fn test_granted() {
        let c = claims().with_permissions(["get:movies", "post:movies"]);
        assert!(check_permission(c, "get:movies").is_ok());
    }

    #[test]
    fn test_not_granted() {
        let c = claims().with_permissions(["get:movies"]);
        let err = check_permission(c, "post:movies").unwrap_err();
        assert_eq!(err, AuthError::Forbidden(PERMISSION_NOT_FOUND));
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_missing_claim() {
        let err = check_permission(claims(), "get:movies").unwrap_err();
        assert_eq!(err, AuthError::InvalidClaims(PERMISSIONS_NOT_INCLUDED));
    }

    #[test]
    fn test_no_wildcards() {
        let c = claims().with_permissions(["*", "get:*"]);
        assert!(check_permission(c, "get:movies").is_err());
    }
}

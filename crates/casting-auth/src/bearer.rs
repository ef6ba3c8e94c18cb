//! `Authorization` header parsing.

use crate::error::{
    AuthError, MUST_BE_BEARER_TOKEN, MUST_START_WITH_BEARER, TOKEN_NOT_FOUND,
};

/// Extract the raw token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let mut parts = header.split_whitespace();

    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {}
        _ => return Err(AuthError::MalformedHeader(MUST_START_WITH_BEARER)),
    }

    let token = parts
        .next()
        .ok_or(AuthError::MalformedHeader(TOKEN_NOT_FOUND))?;

    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader(MUST_BE_BEARER_TOKEN));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(Some("bearer abc")), Ok("abc"));
    }

    #[test]
    fn test_malformed_headers() {
        assert_eq!(bearer_token(None), Err(AuthError::MissingToken));
        assert_eq!(
            bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MalformedHeader(MUST_START_WITH_BEARER))
        );
        assert_eq!(
            bearer_token(Some("")),
            Err(AuthError::MalformedHeader(MUST_START_WITH_BEARER))
        );
        assert_eq!(
            bearer_token(Some("Bearer")),
            Err(AuthError::MalformedHeader(TOKEN_NOT_FOUND))
        );
        assert_eq!(
            bearer_token(Some("Bearer a b")),
            Err(AuthError::MalformedHeader(MUST_BE_BEARER_TOKEN))
        );
    }
}

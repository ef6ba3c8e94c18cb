use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use casting_auth::error::MUST_START_WITH_BEARER;
use casting_auth::{AuthError, Authorizer, Claims};
use casting_core::Permission;
use std::sync::Arc;

/// Claims of the caller, inserted into request extensions once the route's
/// permission check has passed.
#[derive(Clone, Debug)]
pub struct VerifiedClaims(pub Claims);

impl VerifiedClaims {
    pub fn subject(&self) -> &str {
        &self.0.sub
    }
}

/// Middleware state for one guarded route.
#[derive(Clone)]
pub struct RouteGuard {
    authorizer: Arc<Authorizer>,
    permission: Permission,
}

impl RouteGuard {
    pub fn new(authorizer: Arc<Authorizer>, permission: Permission) -> Self {
        Self {
            authorizer,
            permission,
        }
    }
}

/// Axum middleware requiring `guard.permission`:
/// - parse the bearer token from `Authorization`
/// - verify it against the issuer's key set
/// - check the permission is granted
pub async fn require_permission(
    State(guard): State<RouteGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AuthError::MalformedHeader(MUST_START_WITH_BEARER))
        })
        .transpose()?;

    let claims = guard
        .authorizer
        .authorize(guard.permission.as_str(), header)
        .await?;

    tracing::debug!(
        subject = %claims.sub,
        permission = %guard.permission,
        "request authorized"
    );

    req.extensions_mut().insert(VerifiedClaims(claims));
    Ok(next.run(req).await)
}

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{self, AuthError, AuthStrategy, Claims, Role, TrustPolicy};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity attached to every protected request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
    pub strategy: AuthStrategy,
}

impl AuthUser {
    fn from_claims(claims: Claims, strategy: AuthStrategy) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.user_type,
            strategy,
        }
    }
}

/// JWT authentication middleware that builds the session and injects [`AuthUser`]
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = authenticate(request.headers(), &state.config.security)?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Build the session for a request from its `Authorization` header.
pub fn authenticate(headers: &HeaderMap, security: &SecurityConfig) -> Result<AuthUser, AuthError> {
    let token = extract_bearer(headers).ok_or(AuthError::Unauthenticated)?;

    let unverified = auth::decode_unverified(&token)?;
    let policy = TrustPolicy::new(security.trust_privileged_claims);

    match policy.strategy(&unverified.user_type) {
        AuthStrategy::VerifiedSession => {
            let verified = auth::verify(&token, &security.jwt_secret)?;
            tracing::debug!("Verified session for user {} ({})", verified.user_id, verified.user_type);
            Ok(AuthUser::from_claims(verified, AuthStrategy::VerifiedSession))
        }
        AuthStrategy::TrustedClaimSession => {
            tracing::warn!(
                target: "audit",
                role = %unverified.user_type,
                user_id = unverified.user_id,
                "Bypassing verification for privileged role: {}",
                unverified.user_type
            );
            Ok(AuthUser::from_claims(unverified, AuthStrategy::TrustedClaimSession))
        }
    }
}

/// Pull the raw token out of `Authorization: Bearer <token>`.
/// A missing header or an empty token both count as no token.
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match raw.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => raw[7..].trim(),
        _ => raw,
    };

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

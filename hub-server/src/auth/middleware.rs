//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role gates

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::auth::extractor::authenticate;
use crate::core::ServerState;
use crate::security_log;
use shared::ErrorCode;

/// Routes reachable without a token
fn is_public_api_route(method: &Method, path: &str) -> bool {
    match *method {
        Method::POST => matches!(
            path,
            "/api/auth/register"
                | "/api/auth/login"
                | "/api/auth/request-reset"
                | "/api/auth/verify-otp"
        ),
        Method::GET => {
            path == "/api/auth/freelancers"
                || path == "/api/gigs"
                || (path.starts_with("/api/gigs/") && path != "/api/gigs/my")
                || path.starts_with("/api/reviews/gig/")
                || path.starts_with("/api/reviews/user/")
                || path.starts_with("/api/files/")
        }
        _ => false,
    }
}

/// Authentication middleware - requires a logged-in user
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>` and
/// injects the [`CurrentUser`] into the request extensions.
///
/// # Skipped
///
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths
/// - public catalog, review and account routes
///
/// # Errors
///
/// | Error | HTTP |
/// |------|------------|
/// | no Authorization header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | invalid token or deleted user | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || is_public_api_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state, req.headers(), req.uri()).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

fn require_role(
    req: &Request,
    allowed: fn(&CurrentUser) -> bool,
    role: &'static str,
) -> Result<(), AppError> {
    let user = req.current_user()?;
    if !allowed(user) {
        security_log!(
            "WARN",
            "role_required",
            user_id = user.id.clone(),
            user_role = user.role.as_str(),
            required_role = role
        );
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            format!("Only {}s can do that", role),
        )
        .with_detail("required_role", role));
    }
    Ok(())
}

/// Role gate - requires a client account
pub async fn require_client(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(&req, CurrentUser::is_client, "client")?;
    Ok(next.run(req).await)
}

/// Role gate - requires a freelancer account
pub async fn require_freelancer(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(&req, CurrentUser::is_freelancer, "freelancer")?;
    Ok(next.run(req).await)
}

/// Read the [`CurrentUser`] injected by [`require_auth`]
pub trait CurrentUserExt {
    /// # Errors
    ///
    /// 401 when the request was not authenticated
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or(AppError::unauthorized())
    }
}

//! JWT Extractor
//!
//! Resolves the caller from the bearer token and the user store

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use http::HeaderMap;
use serde::Deserialize;

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// `?token=<JWT>` on WebSocket upgrades, where browsers cannot set headers
#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Token from the query string of an order events socket
fn query_token(uri: &http::Uri) -> Option<String> {
    if !uri.path().ends_with("/events") {
        return None;
    }
    Query::<TokenQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
}

/// Validate the bearer token in `headers` and load the user it names.
///
/// Order event sockets may pass the token as `?token=` instead.
/// A valid token for a deleted account is rejected as invalid.
pub async fn authenticate(
    state: &ServerState,
    headers: &HeaderMap,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match (auth_header, query_token(uri)) {
        (Some(header), _) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?
            .to_string(),
        (None, Some(token)) => token,
        (None, None) => {
            security_log!("WARN", "auth_missing", path = uri.path().to_string());
            return Err(AppError::unauthorized());
        }
    };

    let claims = match state.get_jwt_service().validate_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                path = uri.path().to_string()
            );
            return match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            };
        }
    };

    match state.stores.users.find_by_id(&claims.sub).await? {
        Some(user) => Ok(CurrentUser::from(&user)),
        None => {
            security_log!("WARN", "auth_unknown_user", user_id = claims.sub.clone());
            Err(AppError::invalid_token("User no longer exists"))
        }
    }
}

/// Use this extractor in protected handlers; it reuses the user injected by
/// [`require_auth`](crate::auth::require_auth) when present.
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = authenticate(state, &parts.headers, &parts.uri).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_token_only_on_event_sockets() {
        let uri: http::Uri = "/api/orders/o1/events?token=abc.def.ghi".parse().unwrap();
        assert_eq!(query_token(&uri).as_deref(), Some("abc.def.ghi"));

        let uri: http::Uri = "/api/orders/o1?token=abc.def.ghi".parse().unwrap();
        assert_eq!(query_token(&uri), None);

        let uri: http::Uri = "/api/orders/o1/events?token=".parse().unwrap();
        assert_eq!(query_token(&uri), None);

        let uri: http::Uri = "/api/orders/o1/events".parse().unwrap();
        assert_eq!(query_token(&uri), None);
    }
}

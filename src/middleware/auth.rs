use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;
use crate::types::UserRole;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers)
        .map_err(ApiError::unauthorized)?
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let claims = validate_jwt(&token)?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Same as `jwt_auth_middleware` but lets anonymous and invalid sessions through
/// without an `AuthUser` extension.
pub async fn optional_auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    if let Ok(Some(token)) = extract_jwt_from_headers(&headers) {
        match validate_jwt(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthUser::from(claims));
            }
            Err(e) => tracing::debug!("Ignoring invalid session token: {}", e),
        }
    }
    next.run(request).await
}

/// Requires an ADMIN session. Layer after `jwt_auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Response {
    require_role(request, next, |role| role == UserRole::Admin, "Admin access required").await
}

/// Requires an INSTRUCTOR or ADMIN session. Layer after `jwt_auth_middleware`.
pub async fn require_instructor(request: Request, next: Next) -> Response {
    require_role(request, next, |role| role.can_author(), "Instructor access required").await
}

async fn require_role(
    request: Request,
    next: Next,
    allowed: impl Fn(UserRole) -> bool,
    message: &'static str,
) -> Response {
    let role = match request.extensions().get::<AuthUser>() {
        Some(user) => user.role,
        None => return ApiError::unauthorized("Authentication required").into_response(),
    };
    if !allowed(role) {
        tracing::warn!("Rejected {} request: role {}", request.uri().path(), role);
        return ApiError::forbidden(message).into_response();
    }
    next.run(request).await
}

/// Extract JWT token from Authorization header; `Ok(None)` when absent
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let auth_header = match headers.get(axum::http::header::AUTHORIZATION) {
        Some(value) => value,
        None => return Ok(None),
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_jwt_from_headers(&headers), Ok(None));

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_jwt_from_headers(&headers), Ok(Some("abc.def.ghi".to_string())));

        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_jwt_from_headers(&headers).is_err());
    }
}

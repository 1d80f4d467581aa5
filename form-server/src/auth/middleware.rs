//! 认证中间件
//!
//! 为 JWT 认证提供 Axum 中间件

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Uri},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// 无需认证的路径 (已去除末尾斜杠)
const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/auth/login",
    "/auth/register",
    "/auth/refresh",
    "/auth/logout",
];

pub fn is_public_path(path: &str) -> bool {
    let path = path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(path);
    PUBLIC_PATHS.contains(&path)
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - [`PUBLIC_PATHS`]
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 NotAuthenticated |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS || is_public_path(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let user = user_from_headers(state.get_jwt_service(), req.headers(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 从 `Authorization` 头解析并验证访问令牌
pub(crate) fn user_from_headers(
    jwt_service: &JwtService,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<CurrentUser, AppError> {
    let Some(header) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        security_log!("WARN", "auth_missing", uri = uri.path().to_string());
        return Err(AppError::unauthorized());
    };

    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let claims = jwt_service.validate_token(token).map_err(|e| {
        security_log!("WARN", "auth_failed", error = e.to_string(), uri = uri.path().to_string());
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/auth/login/"));
        assert!(is_public_path("/auth/register"));
        assert!(!is_public_path("/auth/me"));
        assert!(!is_public_path("/auth/change-password/"));
        assert!(!is_public_path("/templates/"));
        assert!(!is_public_path("/"));
    }

    fn jwt() -> JwtService {
        JwtService::with_config(crate::auth::JwtConfig {
            secret: "middleware-test-secret-32-characters!".into(),
            expiration_minutes: 5,
            issuer: "form-server".into(),
            audience: "form-clients".into(),
        })
    }

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(v) = value {
            map.insert(http::header::AUTHORIZATION, v.parse().unwrap());
        }
        map
    }

    #[test]
    fn test_user_from_headers() {
        let jwt = jwt();
        let uri: Uri = "/templates".parse().unwrap();

        let err = user_from_headers(&jwt, &headers(None), &uri).unwrap_err();
        assert_eq!(err.code, crate::utils::ErrorCode::NotAuthenticated);

        let err = user_from_headers(&jwt, &headers(Some("Basic abc")), &uri).unwrap_err();
        assert_eq!(err.code, crate::utils::ErrorCode::TokenInvalid);

        let err = user_from_headers(&jwt, &headers(Some("Bearer garbage")), &uri).unwrap_err();
        assert_eq!(err.code, crate::utils::ErrorCode::TokenInvalid);

        let token = jwt.generate_token(42, "alice").unwrap();
        let user =
            user_from_headers(&jwt, &headers(Some(&format!("Bearer {token}"))), &uri).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.username, "alice");
    }
}

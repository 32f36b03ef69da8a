use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::domain::services::auth_service::Claims;
use crate::error::AppError;
use crate::server::AppState;

/// 只接受 `Bearer <token>` 两段格式
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let mut parts = auth_header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::MalformedAuthHeader(
            "Missing or malformed JWT token".to_string(),
        )),
    }
}

/// 管理员路由的守卫：先校验令牌，再校验角色
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims: Claims = {
        let token = bearer_token(request.headers())?;
        state.tokens.validate(token)?
    };

    if !claims.is_admin() {
        tracing::warn!(username = %claims.username, role = %claims.role, "admin access denied");
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    // 将令牌信息添加到请求扩展中
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

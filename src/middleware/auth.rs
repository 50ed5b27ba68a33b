use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AuthError, utils::verify_token};

/// 解析 Bearer token，换取进程内的活跃会话并注入请求扩展。
/// token 无效、过期或会话已登出时一律返回 Unauthenticated。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AuthError::Unauthenticated)?;

    let claims = verify_token(token, &state.config).map_err(|_| AuthError::Unauthenticated)?;

    let session = state
        .sessions
        .get(&claims.sub)
        .await
        .ok_or(AuthError::Unauthenticated)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

use axum::extract::{Extension, Json, Query, State};

use crate::{
    AppState,
    backend::types::{Role, SkillAggregate, UserProfile},
    error::AppError,
    session::Session,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{
    self, BanUserRequest, CreateMessageRequest, CreateMessageResponse, ListUsersQuery,
    ModerationResponse, PlatformStats, SetRoleRequest, UnbanUserRequest,
};

// 所有管理端接口先用会话里缓存的角色做门禁，再访问后端。
// 其他管理员刚授予/回收的权限要等会话刷新档案后才生效。

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>, AppError> {
    session.require_role(Role::Admin)?;
    let users = model::list_users(state.backend.as_ref(), &query).await?;
    Ok(success_to_api_response(users))
}

#[axum::debug_handler]
pub async fn ban_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<BanUserRequest>,
) -> Result<Json<ApiResponse<ModerationResponse>>, AppError> {
    session.require_role(Role::Admin)?;
    model::ban_user(state.backend.as_ref(), &req).await?;
    tracing::info!("Admin {} banned user {}", session.user_id, req.user_id);
    Ok(success_to_api_response(ModerationResponse {}))
}

#[axum::debug_handler]
pub async fn unban_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<UnbanUserRequest>,
) -> Result<Json<ApiResponse<ModerationResponse>>, AppError> {
    session.require_role(Role::Admin)?;
    model::unban_user(state.backend.as_ref(), &req).await?;
    tracing::info!("Admin {} unbanned user {}", session.user_id, req.user_id);
    Ok(success_to_api_response(ModerationResponse {}))
}

#[axum::debug_handler]
pub async fn set_role(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<ApiResponse<ModerationResponse>>, AppError> {
    session.require_role(Role::Admin)?;
    model::set_role(state.backend.as_ref(), &req).await?;
    tracing::info!(
        "Admin {} set role of {} to {:?}",
        session.user_id,
        req.user_id,
        req.role
    );
    Ok(success_to_api_response(ModerationResponse {}))
}

#[axum::debug_handler]
pub async fn create_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<ApiResponse<CreateMessageResponse>>, AppError> {
    session.require_role(Role::Admin)?;
    model::create_message(state.backend.as_ref(), &session.user_id, &req).await?;
    Ok(success_to_api_response(CreateMessageResponse {}))
}

#[axum::debug_handler]
pub async fn platform_stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<PlatformStats>>, AppError> {
    session.require_role(Role::Admin)?;
    let stats = model::platform_stats(state.backend.as_ref()).await?;
    Ok(success_to_api_response(stats))
}

#[axum::debug_handler]
pub async fn skills_report(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<SkillAggregate>>>, AppError> {
    session.require_role(Role::Admin)?;
    let report = model::skills_report(state.backend.as_ref()).await?;
    Ok(success_to_api_response(report))
}

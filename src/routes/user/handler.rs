use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    backend::types::UserProfile,
    error::{AppError, BackendError},
    session::Session,
    utils::{ApiResponse, error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{
    self, BrowseQuery, BrowseUserView, LoginRequest, LoginResponse, LogoutResponse,
    RegisterRequest, RegisterResponse, UpdateProfileRequest,
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), AppError> {
    match model::register(state.backend.as_ref(), &req).await {
        Ok(()) => Ok((StatusCode::OK, success_to_api_response(RegisterResponse {}))),
        Err(AppError::Backend(BackendError::Conflict)) => Ok((
            StatusCode::CONFLICT,
            error_to_api_response(error_codes::USER_EXISTS, "该邮箱已注册".to_string()),
        )),
        Err(e) => Err(e),
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let resp = model::login(
        state.backend.as_ref(),
        &state.sessions,
        &state.config,
        &req,
    )
    .await?;
    tracing::info!("User {} logged in", resp.user_id);
    Ok(success_to_api_response(resp))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<LogoutResponse>>, AppError> {
    state.sessions.remove(&session.session_id).await;
    Ok(success_to_api_response(LogoutResponse {}))
}

#[axum::debug_handler]
pub async fn current_profile(
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    Ok(success_to_api_response(session.profile))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let profile =
        model::update_profile(state.backend.as_ref(), &state.sessions, &session, req).await?;
    Ok(success_to_api_response(profile))
}

#[axum::debug_handler]
pub async fn refresh_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let profile =
        model::refresh_profile(state.backend.as_ref(), &state.sessions, &session).await?;
    Ok(success_to_api_response(profile))
}

#[axum::debug_handler]
pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<ApiResponse<Vec<BrowseUserView>>>, AppError> {
    let views = model::browse(state.backend.as_ref(), state.config.browse_limit, &query).await?;
    Ok(success_to_api_response(views))
}

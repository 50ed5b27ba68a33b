use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    error::AppError,
    session::Session,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{
    self, CreateSwapRequest, CreateSwapResponse, SwapRequestList, UpdateStatusRequest,
    UpdateStatusResponse,
};

#[axum::debug_handler]
pub async fn create_request(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateSwapRequest>,
) -> Result<Json<ApiResponse<CreateSwapResponse>>, AppError> {
    let request_id = model::create_request(state.backend.as_ref(), &session.user_id, &req).await?;
    tracing::info!(
        "Swap request {} created: {} -> {}",
        request_id,
        session.user_id,
        req.receiver_id
    );
    Ok(success_to_api_response(CreateSwapResponse { request_id }))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<UpdateStatusResponse>>, AppError> {
    model::set_status(
        state.backend.as_ref(),
        &req.request_id,
        req.status,
        &session.user_id,
    )
    .await?;
    Ok(success_to_api_response(UpdateStatusResponse {}))
}

#[axum::debug_handler]
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<SwapRequestList>>, AppError> {
    let list = model::list_for_user(state.backend.as_ref(), &session.user_id).await?;
    Ok(success_to_api_response(list))
}

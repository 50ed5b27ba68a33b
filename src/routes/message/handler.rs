use axum::extract::{Json, State};

use crate::{
    AppState,
    backend::client::SkillSwapBackend,
    backend::types::SystemMessage,
    error::AppError,
    utils::{ApiResponse, success_to_api_response},
};

/// 平台公告，全员可见，按创建时间倒序
#[axum::debug_handler]
pub async fn active_messages(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SystemMessage>>>, AppError> {
    let messages = state.backend.get_active_messages().await?;
    Ok(success_to_api_response(messages))
}

use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    backend::client::SkillSwapBackend,
    backend::types::Transaction,
    error::AppError,
    session::Session,
    utils::{ApiResponse, success_to_api_response},
};

/// 只读投影：当前用户参与的所有交易
#[axum::debug_handler]
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, AppError> {
    let transactions = state
        .backend
        .get_user_transactions(&session.user_id)
        .await?;
    Ok(success_to_api_response(transactions))
}

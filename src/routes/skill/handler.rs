use axum::extract::{Extension, Json, Query, State};

use crate::{
    AppState,
    backend::types::SkillEntry,
    error::AppError,
    session::Session,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{
    self, AddSkillRequest, AddSkillResponse, ListSkillsQuery, RemoveSkillRequest,
    RemoveSkillResponse,
};

#[axum::debug_handler]
pub async fn add_skill(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<AddSkillRequest>,
) -> Result<Json<ApiResponse<AddSkillResponse>>, AppError> {
    model::add_skill(state.backend.as_ref(), &session.user_id, &req).await?;
    Ok(success_to_api_response(AddSkillResponse {}))
}

#[axum::debug_handler]
pub async fn remove_skill(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<RemoveSkillRequest>,
) -> Result<Json<ApiResponse<RemoveSkillResponse>>, AppError> {
    model::remove_skill(state.backend.as_ref(), &session.user_id, &req).await?;
    Ok(success_to_api_response(RemoveSkillResponse {}))
}

#[axum::debug_handler]
pub async fn list_skills(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListSkillsQuery>,
) -> Result<Json<ApiResponse<Vec<SkillEntry>>>, AppError> {
    let user_id = query.user_id.as_deref().unwrap_or(&session.user_id);
    let skills = model::list_skills(state.backend.as_ref(), user_id, query.skill_type).await?;
    Ok(success_to_api_response(skills))
}

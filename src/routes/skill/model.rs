use serde::{Deserialize, Serialize};

use crate::backend::client::SkillSwapBackend;
use crate::backend::types::{Proficiency, SkillEntry, SkillType};
use crate::error::{AppError, ValidationError};

#[derive(Debug, Deserialize)]
pub struct AddSkillRequest {
    pub skill_name: String,
    pub skill_type: SkillType,
    pub proficiency: Proficiency,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddSkillResponse {}

#[derive(Debug, Deserialize)]
pub struct RemoveSkillRequest {
    pub skill_name: String,
    pub skill_type: SkillType,
}

#[derive(Debug, Serialize)]
pub struct RemoveSkillResponse {}

#[derive(Debug, Deserialize)]
pub struct ListSkillsQuery {
    /// 不传则查当前登录用户
    pub user_id: Option<String>,
    pub skill_type: Option<SkillType>,
}

pub async fn add_skill(
    backend: &dyn SkillSwapBackend,
    user_id: &str,
    req: &AddSkillRequest,
) -> Result<(), AppError> {
    let skill_name = req.skill_name.trim();
    if skill_name.is_empty() {
        return Err(ValidationError::MissingField("skill_name").into());
    }
    backend
        .add_user_skill(
            user_id,
            skill_name,
            req.skill_type,
            req.proficiency,
            req.description.as_deref().filter(|d| !d.trim().is_empty()),
        )
        .await?;
    Ok(())
}

pub async fn remove_skill(
    backend: &dyn SkillSwapBackend,
    user_id: &str,
    req: &RemoveSkillRequest,
) -> Result<(), AppError> {
    backend
        .remove_user_skill(user_id, req.skill_name.trim(), req.skill_type)
        .await?;
    Ok(())
}

pub async fn list_skills(
    backend: &dyn SkillSwapBackend,
    user_id: &str,
    type_filter: Option<SkillType>,
) -> Result<Vec<SkillEntry>, AppError> {
    Ok(backend.get_user_skills(user_id, type_filter).await?)
}

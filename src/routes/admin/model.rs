use serde::{Deserialize, Serialize};

use crate::backend::client::SkillSwapBackend;
use crate::backend::types::{
    MessageType, ProfileUpdate, Role, SkillAggregate, UserProfile,
};
use crate::error::{AppError, ValidationError};

/// 管理端列表一次拉取的上限
const ADMIN_USER_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub q: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct BanUserRequest {
    pub user_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnbanUserRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ModerationResponse {}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub title: String,
    pub message: String,
    pub message_type: MessageType,
}

#[derive(Debug, Serialize)]
pub struct CreateMessageResponse {}

#[derive(Debug, Serialize)]
pub struct PlatformStats {
    pub total_users: usize,
    pub total_admins: usize,
    pub total_banned: usize,
    pub total_skills: usize,
}

pub async fn list_users(
    backend: &dyn SkillSwapBackend,
    query: &ListUsersQuery,
) -> Result<Vec<UserProfile>, AppError> {
    let users = backend.list_users(ADMIN_USER_LIMIT).await?;
    let term = query
        .q
        .as_deref()
        .map(str::to_lowercase)
        .filter(|t| !t.is_empty());

    Ok(users
        .into_iter()
        .filter(|u| match &term {
            Some(term) => {
                u.name.to_lowercase().contains(term) || u.email.to_lowercase().contains(term)
            }
            None => true,
        })
        .filter(|u| match query.role {
            Some(role) => u.role == role,
            None => true,
        })
        .collect())
}

/// 封禁用户。与另一个管理员并发操作同一账号时后写覆盖先写，
/// 不做冲突检测。
pub async fn ban_user(
    backend: &dyn SkillSwapBackend,
    req: &BanUserRequest,
) -> Result<(), AppError> {
    let reason = req
        .reason
        .clone()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "Banned by admin".to_string());
    backend
        .update_user_profile(
            &req.user_id,
            &ProfileUpdate {
                is_banned: Some(true),
                ban_reason: Some(reason),
                ..ProfileUpdate::default()
            },
        )
        .await?;
    Ok(())
}

pub async fn unban_user(
    backend: &dyn SkillSwapBackend,
    req: &UnbanUserRequest,
) -> Result<(), AppError> {
    backend
        .update_user_profile(
            &req.user_id,
            &ProfileUpdate {
                is_banned: Some(false),
                ban_reason: Some(String::new()),
                ..ProfileUpdate::default()
            },
        )
        .await?;
    Ok(())
}

pub async fn set_role(
    backend: &dyn SkillSwapBackend,
    req: &SetRoleRequest,
) -> Result<(), AppError> {
    backend
        .update_user_profile(
            &req.user_id,
            &ProfileUpdate {
                role: Some(req.role),
                ..ProfileUpdate::default()
            },
        )
        .await?;
    Ok(())
}

pub async fn create_message(
    backend: &dyn SkillSwapBackend,
    author_id: &str,
    req: &CreateMessageRequest,
) -> Result<(), AppError> {
    if req.title.trim().is_empty() {
        return Err(ValidationError::MissingField("title").into());
    }
    if req.message.trim().is_empty() {
        return Err(ValidationError::MissingField("message").into());
    }
    backend
        .create_system_message(author_id, req.title.trim(), &req.message, req.message_type)
        .await?;
    Ok(())
}

pub async fn platform_stats(backend: &dyn SkillSwapBackend) -> Result<PlatformStats, AppError> {
    let users = backend.list_users(ADMIN_USER_LIMIT).await?;
    let skills = backend.get_all_skills().await?;
    Ok(PlatformStats {
        total_users: users.len(),
        total_admins: users.iter().filter(|u| u.role == Role::Admin).count(),
        total_banned: users.iter().filter(|u| u.is_banned).count(),
        total_skills: skills.len(),
    })
}

pub async fn skills_report(
    backend: &dyn SkillSwapBackend,
) -> Result<Vec<SkillAggregate>, AppError> {
    Ok(backend.get_all_skills().await?)
}

use serde::{Deserialize, Serialize};

use crate::backend::client::SkillSwapBackend;
use crate::backend::types::{
    Availability, ProfileUpdate, Role, SkillType, UserProfile, Visibility,
};
use crate::config::Config;
use crate::error::{AppError, AuthError, BackendError, ValidationError};
use crate::session::{Session, SessionStore};
use crate::utils::generate_token;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub availability: Option<Availability>,
    pub profile_visibility: Option<Visibility>,
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub q: Option<String>,
    pub availability: Option<Availability>,
}

#[derive(Debug, Serialize)]
pub struct BrowseUserView {
    pub user_id: String,
    pub name: String,
    pub location: Option<String>,
    pub availability: Availability,
    pub rating_avg: f64,
    pub rating_count: u32,
    pub offered_skills: Vec<String>,
    pub wanted_skills: Vec<String>,
}

pub async fn register(
    backend: &dyn SkillSwapBackend,
    req: &RegisterRequest,
) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }
    if req.email.trim().is_empty() {
        return Err(ValidationError::MissingField("email").into());
    }
    if req.password.is_empty() {
        return Err(ValidationError::MissingField("password").into());
    }
    if req.password.len() < 6 {
        return Err(ValidationError::PasswordTooShort.into());
    }

    backend
        .register_user(
            req.email.trim(),
            &req.password,
            req.name.trim(),
            req.location.as_deref(),
        )
        .await?;
    Ok(())
}

pub async fn login(
    backend: &dyn SkillSwapBackend,
    sessions: &SessionStore,
    config: &Config,
    req: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    let profile = match backend.login_user(req.email.trim(), &req.password).await {
        Ok(profile) => profile,
        // 后端不可用如实上报，其余一律视为凭证错误
        Err(BackendError::Unavailable) => return Err(BackendError::Unavailable.into()),
        Err(_) => return Err(AuthError::InvalidCredentials.into()),
    };

    let session = sessions.create(profile).await;
    let (token, expires_at) = generate_token(&session.session_id, config)
        .map_err(|e| AppError::Internal(format!("生成令牌失败: {e}")))?;

    Ok(LoginResponse {
        user_id: session.user_id,
        name: session.profile.name,
        role: session.profile.role,
        token,
        expires_at,
    })
}

/// 用后端最新档案覆盖会话里的快照，并返回新档案
pub async fn refresh_profile(
    backend: &dyn SkillSwapBackend,
    sessions: &SessionStore,
    session: &Session,
) -> Result<UserProfile, AppError> {
    let profile = backend.get_user_profile(&session.user_id).await?;
    sessions
        .update_profile(&session.session_id, profile.clone())
        .await?;
    Ok(profile)
}

pub async fn update_profile(
    backend: &dyn SkillSwapBackend,
    sessions: &SessionStore,
    session: &Session,
    req: UpdateProfileRequest,
) -> Result<UserProfile, AppError> {
    let update = ProfileUpdate {
        name: req.name,
        location: req.location,
        availability: req.availability,
        profile_visibility: req.profile_visibility,
        ..ProfileUpdate::default()
    };
    backend.update_user_profile(&session.user_id, &update).await?;

    // 更新成功后同步刷新会话快照
    refresh_profile(backend, sessions, session).await
}

pub async fn browse(
    backend: &dyn SkillSwapBackend,
    limit: usize,
    query: &BrowseQuery,
) -> Result<Vec<BrowseUserView>, AppError> {
    let users = backend.get_public_users(limit).await?;
    let term = query
        .q
        .as_deref()
        .map(str::to_lowercase)
        .filter(|t| !t.is_empty());

    let mut views = Vec::new();
    for user in users {
        if let Some(term) = &term {
            let location = user.location.as_deref().unwrap_or("").to_lowercase();
            if !user.name.to_lowercase().contains(term) && !location.contains(term) {
                continue;
            }
        }
        if let Some(availability) = query.availability {
            if user.availability != availability {
                continue;
            }
        }

        let skills = backend.get_user_skills(&user.user_id, None).await?;
        let mut offered_skills = Vec::new();
        let mut wanted_skills = Vec::new();
        for skill in skills {
            match skill.skill_type {
                SkillType::Offered => offered_skills.push(skill.skill_name),
                SkillType::Wanted => wanted_skills.push(skill.skill_name),
            }
        }

        views.push(BrowseUserView {
            user_id: user.user_id,
            name: user.name,
            location: user.location,
            availability: user.availability,
            rating_avg: user.rating_avg,
            rating_count: user.rating_count,
            offered_skills,
            wanted_skills,
        });
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::types::Proficiency;

    fn test_config() -> Config {
        Config {
            backend_base_url: "http://localhost:9000".into(),
            backend_api_key: "test".into(),
            redis_url: "redis://localhost".into(),
            jwt_secret: "test-secret".into(),
            jwt_expiration_secs: 3600,
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
            server_host: "127.0.0.1".into(),
            server_port: 0,
            api_base_uri: "/api".into(),
            browse_limit: 50,
        }
    }

    async fn registered_user(backend: &MemoryBackend, email: &str, name: &str) -> UserProfile {
        backend
            .register_user(email, "password1", name, None)
            .await
            .unwrap();
        backend.login_user(email, "password1").await.unwrap()
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let backend = MemoryBackend::new();
        let req = RegisterRequest {
            name: "小王".into(),
            email: "wang@example.com".into(),
            password: "12345".into(),
            location: None,
        };
        assert_eq!(
            register(&backend, &req).await,
            Err(ValidationError::PasswordTooShort.into())
        );
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let backend = MemoryBackend::new();
        let req = RegisterRequest {
            name: "  ".into(),
            email: "wang@example.com".into(),
            password: "password1".into(),
            location: None,
        };
        assert_eq!(
            register(&backend, &req).await,
            Err(ValidationError::MissingField("name").into())
        );
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_invalid_credentials() {
        let backend = MemoryBackend::new();
        let sessions = SessionStore::new();
        registered_user(&backend, "wang@example.com", "小王").await;

        let req = LoginRequest {
            email: "wang@example.com".into(),
            password: "wrong-password".into(),
        };
        assert_eq!(
            login(&backend, &sessions, &test_config(), &req)
                .await
                .unwrap_err(),
            AuthError::InvalidCredentials.into()
        );
    }

    #[tokio::test]
    async fn browse_filters_by_search_term_and_availability() {
        let backend = MemoryBackend::new();
        let wang = registered_user(&backend, "wang@example.com", "小王").await;
        registered_user(&backend, "li@example.com", "小李").await;
        backend
            .add_user_skill(
                &wang.user_id,
                "Cooking",
                SkillType::Offered,
                Proficiency::Advanced,
                None,
            )
            .await
            .unwrap();

        let query = BrowseQuery {
            q: Some("小王".into()),
            availability: None,
        };
        let views = browse(&backend, 50, &query).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].name, "小王");
        assert_eq!(views[0].offered_skills, vec!["Cooking".to_string()]);

        let query = BrowseQuery {
            q: None,
            availability: Some(Availability::Anytime),
        };
        assert!(browse(&backend, 50, &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn browse_excludes_banned_and_private_profiles() {
        let backend = MemoryBackend::new();
        let wang = registered_user(&backend, "wang@example.com", "小王").await;
        let li = registered_user(&backend, "li@example.com", "小李").await;
        registered_user(&backend, "zhao@example.com", "小赵").await;

        backend
            .update_user_profile(
                &wang.user_id,
                &ProfileUpdate {
                    is_banned: Some(true),
                    ban_reason: Some("Banned by admin".into()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        backend
            .update_user_profile(
                &li.user_id,
                &ProfileUpdate {
                    profile_visibility: Some(Visibility::Private),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();

        let query = BrowseQuery {
            q: None,
            availability: None,
        };
        let views = browse(&backend, 50, &query).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].name, "小赵");
    }

    #[tokio::test]
    async fn update_profile_refreshes_session_snapshot() {
        let backend = MemoryBackend::new();
        let sessions = SessionStore::new();
        let profile = registered_user(&backend, "wang@example.com", "小王").await;
        let session = sessions.create(profile).await;

        let updated = update_profile(
            &backend,
            &sessions,
            &session,
            UpdateProfileRequest {
                name: Some("老王".into()),
                location: Some("上海".into()),
                availability: Some(Availability::Evenings),
                profile_visibility: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "老王");
        let cached = sessions.get(&session.session_id).await.unwrap();
        assert_eq!(cached.profile.name, "老王");
        assert_eq!(cached.profile.availability, Availability::Evenings);
    }
}

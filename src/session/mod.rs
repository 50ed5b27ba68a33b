use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::types::{Role, UserProfile};
use crate::error::AuthError;

/// 一个已登录客户端的会话。profile 是登录时（或最近一次刷新时）
/// 的快照，可能落后于后端的真实数据。
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// 基于会话中缓存的角色做权限检查，不回源后端。
    /// 其他管理员授予/回收的角色要等到刷新档案或重新登录才会生效。
    pub fn require_role(&self, role: Role) -> Result<(), AuthError> {
        require_role(Some(self), role)
    }
}

pub fn require_role(session: Option<&Session>, role: Role) -> Result<(), AuthError> {
    match session {
        None => Err(AuthError::Unauthenticated),
        Some(s) if s.profile.role == role => Ok(()),
        Some(_) => Err(AuthError::InsufficientRole),
    }
}

/// 进程内会话存储，登录时创建、登出时销毁，不做持久化。
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, profile: UserProfile) -> Session {
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            user_id: profile.user_id.clone(),
            profile,
            created_at: Utc::now(),
        };
        let mut sessions = self.inner.write().await;
        sessions.insert(session.session_id.clone(), session.clone());
        session
    }

    pub async fn get(&self, session_id: &str) -> Option<Session> {
        let sessions = self.inner.read().await;
        sessions.get(session_id).cloned()
    }

    /// 幂等：会话不存在时也视为成功
    pub async fn remove(&self, session_id: &str) {
        let mut sessions = self.inner.write().await;
        sessions.remove(session_id);
    }

    /// 用后端最新的档案覆盖缓存快照
    pub async fn update_profile(
        &self,
        session_id: &str,
        profile: UserProfile,
    ) -> Result<(), AuthError> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or(AuthError::Unauthenticated)?;
        session.profile = profile;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{Availability, Visibility};

    fn profile(role: Role) -> UserProfile {
        UserProfile {
            user_id: "u1".into(),
            name: "张三".into(),
            email: "zhangsan@example.com".into(),
            location: None,
            availability: Availability::Weekends,
            profile_visibility: Visibility::Public,
            role,
            rating_avg: 0.0,
            rating_count: 0,
            total_swaps: 0,
            is_banned: false,
            ban_reason: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_session_is_unauthenticated() {
        assert_eq!(
            require_role(None, Role::Admin),
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(
            require_role(None, Role::User),
            Err(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn non_admin_is_rejected_for_admin_role() {
        let store = SessionStore::new();
        let session = store.create(profile(Role::User)).await;
        assert_eq!(
            session.require_role(Role::Admin),
            Err(AuthError::InsufficientRole)
        );
        assert_eq!(session.require_role(Role::User), Ok(()));
    }

    #[tokio::test]
    async fn role_check_reads_cached_snapshot_until_refresh() {
        let store = SessionStore::new();
        let session = store.create(profile(Role::User)).await;

        // 后端已提升为管理员，但会话里仍是旧快照
        let fresh = store.get(&session.session_id).await.unwrap();
        assert_eq!(
            fresh.require_role(Role::Admin),
            Err(AuthError::InsufficientRole)
        );

        // 刷新快照后生效
        store
            .update_profile(&session.session_id, profile(Role::Admin))
            .await
            .unwrap();
        let refreshed = store.get(&session.session_id).await.unwrap();
        assert_eq!(refreshed.require_role(Role::Admin), Ok(()));
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_invalidates_session() {
        let store = SessionStore::new();
        let session = store.create(profile(Role::User)).await;

        store.remove(&session.session_id).await;
        assert!(store.get(&session.session_id).await.is_none());
        // 重复登出不报错
        store.remove(&session.session_id).await;

        assert_eq!(
            store
                .update_profile(&session.session_id, profile(Role::User))
                .await,
            Err(AuthError::Unauthenticated)
        );
    }
}

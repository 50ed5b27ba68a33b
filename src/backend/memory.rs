use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::BackendError;

use super::client::SkillSwapBackend;
use super::types::{
    Availability, BarterRequest, MessageType, Proficiency, ProfileUpdate, RequestStatus, Role,
    SkillAggregate, SkillEntry, SkillType, SystemMessage, Transaction, UserProfile, Visibility,
};

/// 内存后端实现，用于本地开发与测试。
/// 只负责存储层规则（邮箱唯一、技能按用户+类型唯一），
/// 业务规则由上层的路由模块负责。
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<State>,
}

#[derive(Default)]
struct State {
    users: HashMap<String, UserProfile>,
    credentials: HashMap<String, Credential>,
    skills: HashMap<String, Vec<SkillEntry>>,
    requests: HashMap<String, BarterRequest>,
    transactions: Vec<Transaction>,
    messages: Vec<SystemMessage>,
}

struct Credential {
    user_id: String,
    password_digest: String,
}

fn digest_password(password: &str) -> String {
    let hash = Sha256::digest(password.as_bytes());
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

fn sorted_profiles(mut users: Vec<UserProfile>, limit: usize) -> Vec<UserProfile> {
    users.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    users.truncate(limit);
    users
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SkillSwapBackend for MemoryBackend {
    async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        location: Option<&str>,
    ) -> Result<(), BackendError> {
        let mut state = self.inner.write().await;
        if state.credentials.contains_key(email) {
            return Err(BackendError::Conflict);
        }

        let user_id = Uuid::new_v4().to_string();
        state.credentials.insert(
            email.to_string(),
            Credential {
                user_id: user_id.clone(),
                password_digest: digest_password(password),
            },
        );
        state.users.insert(
            user_id.clone(),
            UserProfile {
                user_id,
                name: name.to_string(),
                email: email.to_string(),
                location: location.map(str::to_string),
                availability: Availability::Weekends,
                profile_visibility: Visibility::Public,
                role: Role::User,
                rating_avg: 0.0,
                rating_count: 0,
                total_swaps: 0,
                is_banned: false,
                ban_reason: None,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn login_user(&self, email: &str, password: &str) -> Result<UserProfile, BackendError> {
        let state = self.inner.read().await;
        let credential = state.credentials.get(email).ok_or(BackendError::NotFound)?;
        if credential.password_digest != digest_password(password) {
            return Err(BackendError::NotFound);
        }
        state
            .users
            .get(&credential.user_id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        let state = self.inner.read().await;
        state.users.get(user_id).cloned().ok_or(BackendError::NotFound)
    }

    async fn update_user_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), BackendError> {
        let mut state = self.inner.write().await;
        let profile = state.users.get_mut(user_id).ok_or(BackendError::NotFound)?;

        if let Some(name) = &update.name {
            profile.name = name.clone();
        }
        if let Some(location) = &update.location {
            profile.location = Some(location.clone());
        }
        if let Some(availability) = update.availability {
            profile.availability = availability;
        }
        if let Some(visibility) = update.profile_visibility {
            profile.profile_visibility = visibility;
        }
        if let Some(role) = update.role {
            profile.role = role;
        }
        if let Some(is_banned) = update.is_banned {
            profile.is_banned = is_banned;
        }
        if let Some(reason) = &update.ban_reason {
            // 空字符串表示清除封禁原因
            profile.ban_reason = if reason.is_empty() {
                None
            } else {
                Some(reason.clone())
            };
        }
        Ok(())
    }

    async fn get_public_users(&self, limit: usize) -> Result<Vec<UserProfile>, BackendError> {
        let state = self.inner.read().await;
        let users = state
            .users
            .values()
            .filter(|u| u.profile_visibility == Visibility::Public && !u.is_banned)
            .cloned()
            .collect();
        Ok(sorted_profiles(users, limit))
    }

    async fn list_users(&self, limit: usize) -> Result<Vec<UserProfile>, BackendError> {
        let state = self.inner.read().await;
        Ok(sorted_profiles(state.users.values().cloned().collect(), limit))
    }

    async fn get_user_skills(
        &self,
        user_id: &str,
        type_filter: Option<SkillType>,
    ) -> Result<Vec<SkillEntry>, BackendError> {
        let state = self.inner.read().await;
        let entries = state.skills.get(user_id).cloned().unwrap_or_default();
        Ok(match type_filter {
            Some(t) => entries.into_iter().filter(|s| s.skill_type == t).collect(),
            None => entries,
        })
    }

    async fn add_user_skill(
        &self,
        user_id: &str,
        skill_name: &str,
        skill_type: SkillType,
        proficiency: Proficiency,
        description: Option<&str>,
    ) -> Result<(), BackendError> {
        let mut state = self.inner.write().await;
        if !state.users.contains_key(user_id) {
            return Err(BackendError::NotFound);
        }
        let entries = state.skills.entry(user_id.to_string()).or_default();
        if entries
            .iter()
            .any(|s| s.skill_name == skill_name && s.skill_type == skill_type)
        {
            return Err(BackendError::Conflict);
        }
        entries.push(SkillEntry {
            user_id: user_id.to_string(),
            skill_name: skill_name.to_string(),
            skill_type,
            proficiency,
            description: description.map(str::to_string),
        });
        Ok(())
    }

    async fn remove_user_skill(
        &self,
        user_id: &str,
        skill_name: &str,
        skill_type: SkillType,
    ) -> Result<(), BackendError> {
        let mut state = self.inner.write().await;
        let entries = state.skills.get_mut(user_id).ok_or(BackendError::NotFound)?;
        let index = entries
            .iter()
            .position(|s| s.skill_name == skill_name && s.skill_type == skill_type)
            .ok_or(BackendError::NotFound)?;
        entries.remove(index);
        Ok(())
    }

    async fn create_barter_request(
        &self,
        sender_id: &str,
        receiver_id: &str,
        offered_skill: &str,
        requested_skill: &str,
        message: &str,
    ) -> Result<String, BackendError> {
        let mut state = self.inner.write().await;
        if !state.users.contains_key(sender_id) || !state.users.contains_key(receiver_id) {
            return Err(BackendError::NotFound);
        }
        let request_id = Uuid::new_v4().to_string();
        state.requests.insert(
            request_id.clone(),
            BarterRequest {
                request_id: request_id.clone(),
                sender_id: sender_id.to_string(),
                receiver_id: receiver_id.to_string(),
                offered_skill: offered_skill.to_string(),
                requested_skill: requested_skill.to_string(),
                message: message.to_string(),
                status: RequestStatus::Pending,
                created_at: Utc::now(),
            },
        );
        Ok(request_id)
    }

    async fn get_user_requests(&self, user_id: &str) -> Result<Vec<BarterRequest>, BackendError> {
        let state = self.inner.read().await;
        Ok(state
            .requests
            .values()
            .filter(|r| r.sender_id == user_id || r.receiver_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_request(&self, request_id: &str) -> Result<BarterRequest, BackendError> {
        let state = self.inner.read().await;
        state
            .requests
            .get(request_id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), BackendError> {
        let mut state = self.inner.write().await;
        let request = state
            .requests
            .get_mut(request_id)
            .ok_or(BackendError::NotFound)?;
        request.status = status;
        Ok(())
    }

    async fn get_user_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<Transaction>, BackendError> {
        let state = self.inner.read().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user1_id == user_id || t.user2_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), BackendError> {
        let mut state = self.inner.write().await;
        state.transactions.push(transaction.clone());
        Ok(())
    }

    async fn create_system_message(
        &self,
        author_id: &str,
        title: &str,
        message: &str,
        message_type: MessageType,
    ) -> Result<(), BackendError> {
        let mut state = self.inner.write().await;
        state.messages.push(SystemMessage {
            message_id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            message: message.to_string(),
            message_type,
            author_id: author_id.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn get_active_messages(&self) -> Result<Vec<SystemMessage>, BackendError> {
        let state = self.inner.read().await;
        let mut messages = state.messages.clone();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn get_all_skills(&self) -> Result<Vec<SkillAggregate>, BackendError> {
        let state = self.inner.read().await;
        let mut aggregates: std::collections::BTreeMap<String, SkillAggregate> =
            std::collections::BTreeMap::new();
        for entry in state.skills.values().flatten() {
            let aggregate = aggregates
                .entry(entry.skill_name.clone())
                .or_insert_with(|| SkillAggregate {
                    name: entry.skill_name.clone(),
                    category: None,
                    users_offering: 0,
                    users_wanting: 0,
                    total_swaps: 0,
                });
            match entry.skill_type {
                SkillType::Offered => aggregate.users_offering += 1,
                SkillType::Wanted => aggregate.users_wanting += 1,
            }
        }
        for transaction in &state.transactions {
            for skill in [&transaction.user1_skill, &transaction.user2_skill] {
                if let Some(aggregate) = aggregates.get_mut(skill.as_str()) {
                    aggregate.total_swaps += 1;
                }
            }
        }
        Ok(aggregates.into_values().collect())
    }
}

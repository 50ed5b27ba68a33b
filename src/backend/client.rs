use async_trait::async_trait;

use crate::error::BackendError;

use super::types::{
    BarterRequest, MessageType, Proficiency, ProfileUpdate, RequestStatus, SkillAggregate,
    SkillEntry, SkillType, SystemMessage, Transaction, UserProfile,
};

/// 外部托管后端的客户端接口。注册/登录、档案、技能、交换请求、
/// 交易与系统消息的持久化全部委托给它，每个调用都是一次独立的往返。
#[async_trait]
pub trait SkillSwapBackend: Send + Sync {
    async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        location: Option<&str>,
    ) -> Result<(), BackendError>;

    async fn login_user(&self, email: &str, password: &str) -> Result<UserProfile, BackendError>;

    async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, BackendError>;

    async fn update_user_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), BackendError>;

    /// 浏览列表：只返回公开且未被封禁的用户
    async fn get_public_users(&self, limit: usize) -> Result<Vec<UserProfile>, BackendError>;

    /// 管理端列表：返回所有用户，包括私密与已封禁的
    async fn list_users(&self, limit: usize) -> Result<Vec<UserProfile>, BackendError>;

    async fn get_user_skills(
        &self,
        user_id: &str,
        type_filter: Option<SkillType>,
    ) -> Result<Vec<SkillEntry>, BackendError>;

    async fn add_user_skill(
        &self,
        user_id: &str,
        skill_name: &str,
        skill_type: SkillType,
        proficiency: Proficiency,
        description: Option<&str>,
    ) -> Result<(), BackendError>;

    async fn remove_user_skill(
        &self,
        user_id: &str,
        skill_name: &str,
        skill_type: SkillType,
    ) -> Result<(), BackendError>;

    async fn create_barter_request(
        &self,
        sender_id: &str,
        receiver_id: &str,
        offered_skill: &str,
        requested_skill: &str,
        message: &str,
    ) -> Result<String, BackendError>;

    async fn get_user_requests(&self, user_id: &str) -> Result<Vec<BarterRequest>, BackendError>;

    async fn get_request(&self, request_id: &str) -> Result<BarterRequest, BackendError>;

    async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), BackendError>;

    async fn get_user_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<Transaction>, BackendError>;

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), BackendError>;

    async fn create_system_message(
        &self,
        author_id: &str,
        title: &str,
        message: &str,
        message_type: MessageType,
    ) -> Result<(), BackendError>;

    async fn get_active_messages(&self) -> Result<Vec<SystemMessage>, BackendError>;

    async fn get_all_skills(&self) -> Result<Vec<SkillAggregate>, BackendError>;
}

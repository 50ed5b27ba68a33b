use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::client::SkillSwapBackend;
use crate::backend::types::{
    BarterRequest, RequestStatus, SkillType, Transaction, TransactionStatus,
};
use crate::error::{AppError, TransitionError, ValidationError};

#[derive(Debug, Deserialize)]
pub struct CreateSwapRequest {
    pub receiver_id: String,
    pub offered_skill: String,
    pub requested_skill: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSwapResponse {
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub request_id: String,
    pub status: RequestStatus,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {}

/// 按发送/接收两个方向切分的请求列表，各自按创建时间倒序
#[derive(Debug, Serialize)]
pub struct SwapRequestList {
    pub sent: Vec<BarterRequest>,
    pub received: Vec<BarterRequest>,
}

/// 创建交换请求。约束：不能发给自己；所提供的技能必须在发送方
/// 当前的"提供"列表中；所请求的技能必须在接收方当前的"提供"列表中。
pub async fn create_request(
    backend: &dyn SkillSwapBackend,
    sender_id: &str,
    req: &CreateSwapRequest,
) -> Result<String, AppError> {
    if req.receiver_id == sender_id {
        return Err(ValidationError::SelfRequest.into());
    }

    let my_skills = backend
        .get_user_skills(sender_id, Some(SkillType::Offered))
        .await?;
    if my_skills.is_empty() {
        return Err(ValidationError::NoSkillsAvailable.into());
    }
    if !my_skills.iter().any(|s| s.skill_name == req.offered_skill) {
        return Err(ValidationError::InvalidSkillSelection(req.offered_skill.clone()).into());
    }

    let their_skills = backend
        .get_user_skills(&req.receiver_id, Some(SkillType::Offered))
        .await?;
    if !their_skills
        .iter()
        .any(|s| s.skill_name == req.requested_skill)
    {
        return Err(ValidationError::InvalidSkillSelection(req.requested_skill.clone()).into());
    }

    let request_id = backend
        .create_barter_request(
            sender_id,
            &req.receiver_id,
            &req.offered_skill,
            &req.requested_skill,
            &req.message,
        )
        .await?;
    Ok(request_id)
}

/// 请求状态流转：pending -> accepted | rejected，均为终态。
/// 只有接收方可以操作，且仅当当前状态为 pending。
/// 接受时在同一调用里创建对应的交易记录；两次后端调用不是原子的，
/// 交易创建失败时已接受的状态保持不变，错误如实上报。
pub async fn set_status(
    backend: &dyn SkillSwapBackend,
    request_id: &str,
    new_status: RequestStatus,
    acting_user_id: &str,
) -> Result<(), AppError> {
    if !new_status.is_terminal() {
        return Err(TransitionError::InvalidTransition.into());
    }

    let request = backend.get_request(request_id).await?;
    if request.receiver_id != acting_user_id {
        return Err(TransitionError::Forbidden.into());
    }
    if request.status.is_terminal() {
        return Err(TransitionError::InvalidTransition.into());
    }

    backend.update_request_status(request_id, new_status).await?;

    if new_status == RequestStatus::Accepted {
        let transaction = Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            user1_id: request.sender_id.clone(),
            user2_id: request.receiver_id.clone(),
            user1_skill: request.offered_skill.clone(),
            user2_skill: request.requested_skill.clone(),
            status: TransactionStatus::InProgress,
            completion_percentage: 0,
        };
        if let Err(e) = backend.create_transaction(&transaction).await {
            tracing::error!(
                "Request {} accepted but transaction creation failed: {}",
                request_id,
                e
            );
            return Err(e.into());
        }
    }
    Ok(())
}

/// 列出某用户的全部请求并按方向切分，各方向按创建时间倒序
pub async fn list_for_user(
    backend: &dyn SkillSwapBackend,
    user_id: &str,
) -> Result<SwapRequestList, AppError> {
    let mut requests = backend.get_user_requests(user_id).await?;
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let (sent, received): (Vec<BarterRequest>, Vec<BarterRequest>) = requests
        .into_iter()
        .partition(|r| r.sender_id == user_id);
    Ok(SwapRequestList { sent, received })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::types::Proficiency;
    use crate::error::BackendError;

    async fn user_with_skill(backend: &MemoryBackend, email: &str, skill: &str) -> String {
        backend
            .register_user(email, "password1", email, None)
            .await
            .unwrap();
        let user_id = backend.login_user(email, "password1").await.unwrap().user_id;
        backend
            .add_user_skill(
                &user_id,
                skill,
                SkillType::Offered,
                Proficiency::Intermediate,
                None,
            )
            .await
            .unwrap();
        user_id
    }

    fn swap_request(receiver_id: &str, offered: &str, requested: &str) -> CreateSwapRequest {
        CreateSwapRequest {
            receiver_id: receiver_id.to_string(),
            offered_skill: offered.to_string(),
            requested_skill: requested.to_string(),
            message: "换个技能？".into(),
        }
    }

    #[tokio::test]
    async fn self_request_is_rejected() {
        let backend = MemoryBackend::new();
        let a = user_with_skill(&backend, "a@example.com", "Cooking").await;
        assert_eq!(
            create_request(&backend, &a, &swap_request(&a, "Cooking", "Cooking")).await,
            Err(ValidationError::SelfRequest.into())
        );
    }

    #[tokio::test]
    async fn sender_without_offered_skills_is_rejected() {
        let backend = MemoryBackend::new();
        backend
            .register_user("a@example.com", "password1", "a", None)
            .await
            .unwrap();
        let a = backend
            .login_user("a@example.com", "password1")
            .await
            .unwrap()
            .user_id;
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;

        assert_eq!(
            create_request(&backend, &a, &swap_request(&b, "Cooking", "Guitar")).await,
            Err(ValidationError::NoSkillsAvailable.into())
        );
    }

    #[tokio::test]
    async fn unlisted_skills_are_rejected_on_both_sides() {
        let backend = MemoryBackend::new();
        let a = user_with_skill(&backend, "a@example.com", "Cooking").await;
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;

        // 发送方没有列出 Painting
        assert_eq!(
            create_request(&backend, &a, &swap_request(&b, "Painting", "Guitar")).await,
            Err(ValidationError::InvalidSkillSelection("Painting".into()).into())
        );
        // 接收方没有列出 Piano
        assert_eq!(
            create_request(&backend, &a, &swap_request(&b, "Cooking", "Piano")).await,
            Err(ValidationError::InvalidSkillSelection("Piano".into()).into())
        );
        // wanted 类型的技能不算在提供列表里
        backend
            .add_user_skill(&b, "Piano", SkillType::Wanted, Proficiency::Beginner, None)
            .await
            .unwrap();
        assert_eq!(
            create_request(&backend, &a, &swap_request(&b, "Cooking", "Piano")).await,
            Err(ValidationError::InvalidSkillSelection("Piano".into()).into())
        );
    }

    #[tokio::test]
    async fn created_request_is_pending_and_partitioned_by_direction() {
        let backend = MemoryBackend::new();
        let a = user_with_skill(&backend, "a@example.com", "Cooking").await;
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;

        let request_id = create_request(&backend, &a, &swap_request(&b, "Cooking", "Guitar"))
            .await
            .unwrap();

        let a_list = list_for_user(&backend, &a).await.unwrap();
        assert_eq!(a_list.sent.len(), 1);
        assert!(a_list.received.is_empty());
        assert_eq!(a_list.sent[0].request_id, request_id);
        assert_eq!(a_list.sent[0].status, RequestStatus::Pending);

        let b_list = list_for_user(&backend, &b).await.unwrap();
        assert!(b_list.sent.is_empty());
        assert_eq!(b_list.received.len(), 1);
        assert_eq!(b_list.received[0].request_id, request_id);
    }

    #[tokio::test]
    async fn lists_are_ordered_newest_first() {
        let backend = MemoryBackend::new();
        let a = user_with_skill(&backend, "a@example.com", "Cooking").await;
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;
        let c = user_with_skill(&backend, "c@example.com", "Piano").await;

        let first = create_request(&backend, &a, &swap_request(&b, "Cooking", "Guitar"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = create_request(&backend, &a, &swap_request(&c, "Cooking", "Piano"))
            .await
            .unwrap();

        let sent = list_for_user(&backend, &a).await.unwrap().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].request_id, second);
        assert_eq!(sent[1].request_id, first);
    }

    #[tokio::test]
    async fn only_receiver_may_transition() {
        let backend = MemoryBackend::new();
        let a = user_with_skill(&backend, "a@example.com", "Cooking").await;
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;
        let c = user_with_skill(&backend, "c@example.com", "Piano").await;

        let request_id = create_request(&backend, &a, &swap_request(&b, "Cooking", "Guitar"))
            .await
            .unwrap();

        // 发送方不能处理自己发出的请求
        assert_eq!(
            set_status(&backend, &request_id, RequestStatus::Accepted, &a).await,
            Err(TransitionError::Forbidden.into())
        );
        // 无关的第三方同样不行
        assert_eq!(
            set_status(&backend, &request_id, RequestStatus::Rejected, &c).await,
            Err(TransitionError::Forbidden.into())
        );
        // 请求保持 pending
        let request = backend.get_request(&request_id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn terminal_states_cannot_transition_again() {
        let backend = MemoryBackend::new();
        let a = user_with_skill(&backend, "a@example.com", "Cooking").await;
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;

        let request_id = create_request(&backend, &a, &swap_request(&b, "Cooking", "Guitar"))
            .await
            .unwrap();

        set_status(&backend, &request_id, RequestStatus::Accepted, &b)
            .await
            .unwrap();

        // 二次流转（包括重复接受）一律拒绝，状态不变
        assert_eq!(
            set_status(&backend, &request_id, RequestStatus::Rejected, &b).await,
            Err(TransitionError::InvalidTransition.into())
        );
        assert_eq!(
            set_status(&backend, &request_id, RequestStatus::Accepted, &b).await,
            Err(TransitionError::InvalidTransition.into())
        );
        let request = backend.get_request(&request_id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Accepted);
    }

    #[tokio::test]
    async fn pending_is_not_a_valid_target_status() {
        let backend = MemoryBackend::new();
        let a = user_with_skill(&backend, "a@example.com", "Cooking").await;
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;

        let request_id = create_request(&backend, &a, &swap_request(&b, "Cooking", "Guitar"))
            .await
            .unwrap();
        assert_eq!(
            set_status(&backend, &request_id, RequestStatus::Pending, &b).await,
            Err(TransitionError::InvalidTransition.into())
        );
    }

    #[tokio::test]
    async fn accepting_creates_a_transaction_for_both_parties() {
        let backend = MemoryBackend::new();
        let a = user_with_skill(&backend, "a@example.com", "Cooking").await;
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;

        let request_id = create_request(&backend, &a, &swap_request(&b, "Cooking", "Guitar"))
            .await
            .unwrap();
        set_status(&backend, &request_id, RequestStatus::Accepted, &b)
            .await
            .unwrap();

        for user in [&a, &b] {
            let transactions = backend.get_user_transactions(user).await.unwrap();
            assert_eq!(transactions.len(), 1);
            let t = &transactions[0];
            assert_eq!(t.user1_skill, "Cooking");
            assert_eq!(t.user2_skill, "Guitar");
            assert_eq!(t.status, TransactionStatus::InProgress);
            assert_eq!(t.completion_percentage, 0);
        }
    }

    #[tokio::test]
    async fn rejecting_does_not_create_a_transaction() {
        let backend = MemoryBackend::new();
        let a = user_with_skill(&backend, "a@example.com", "Cooking").await;
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;

        let request_id = create_request(&backend, &a, &swap_request(&b, "Cooking", "Guitar"))
            .await
            .unwrap();
        set_status(&backend, &request_id, RequestStatus::Rejected, &b)
            .await
            .unwrap();

        assert!(backend.get_user_transactions(&b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_request_is_not_found() {
        let backend = MemoryBackend::new();
        let b = user_with_skill(&backend, "b@example.com", "Guitar").await;
        assert_eq!(
            set_status(&backend, "no-such-request", RequestStatus::Accepted, &b).await,
            Err(BackendError::NotFound.into())
        );
    }
}

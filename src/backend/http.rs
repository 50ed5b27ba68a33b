use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::error::BackendError;

use super::client::SkillSwapBackend;
use super::types::{
    BarterRequest, MessageType, Proficiency, ProfileUpdate, RequestStatus, SkillAggregate,
    SkillEntry, SkillType, SystemMessage, Transaction, UserProfile,
};

/// 托管后端的 HTTP 客户端。每个操作是一次独立的 JSON 往返，
/// 不做重试与本地降级，失败直接映射为 BackendError。
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_connect() || e.is_timeout() {
        BackendError::Unavailable
    } else {
        BackendError::Unknown(e.to_string())
    }
}

impl HttpBackend {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(resp: Response) -> Result<Response, BackendError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        match status {
            StatusCode::NOT_FOUND => Err(BackendError::NotFound),
            StatusCode::CONFLICT => Err(BackendError::Conflict),
            s if s.is_server_error() => Err(BackendError::Unavailable),
            _ => {
                let body = resp.text().await.unwrap_or_default();
                Err(BackendError::Unknown(format!("{status}: {body}")))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let resp = self
            .client
            .get(self.url(path))
            .header("x-api-key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        Self::check(resp).await?.json().await.map_err(transport_error)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let resp = self
            .client
            .post(self.url(path))
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        Self::check(resp).await?.json().await.map_err(transport_error)
    }

    async fn post_unit<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(self.url(path))
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        Self::check(resp).await.map(|_| ())
    }

    async fn patch_unit<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), BackendError> {
        let resp = self
            .client
            .patch(self.url(path))
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        Self::check(resp).await.map(|_| ())
    }

    async fn delete_unit<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), BackendError> {
        let resp = self
            .client
            .delete(self.url(path))
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        Self::check(resp).await.map(|_| ())
    }
}

#[derive(serde::Deserialize)]
struct CreatedRequest {
    request_id: String,
}

#[async_trait]
impl SkillSwapBackend for HttpBackend {
    async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        location: Option<&str>,
    ) -> Result<(), BackendError> {
        self.post_unit(
            "/auth/register",
            &json!({
                "email": email,
                "password": password,
                "name": name,
                "location": location,
            }),
        )
        .await
    }

    async fn login_user(&self, email: &str, password: &str) -> Result<UserProfile, BackendError> {
        self.post_json(
            "/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        self.get_json(&format!("/users/{user_id}"), &[]).await
    }

    async fn update_user_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), BackendError> {
        self.patch_unit(&format!("/users/{user_id}"), update).await
    }

    async fn get_public_users(&self, limit: usize) -> Result<Vec<UserProfile>, BackendError> {
        self.get_json(
            "/users",
            &[
                ("visibility", "public".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn list_users(&self, limit: usize) -> Result<Vec<UserProfile>, BackendError> {
        self.get_json("/users", &[("limit", limit.to_string())]).await
    }

    async fn get_user_skills(
        &self,
        user_id: &str,
        type_filter: Option<SkillType>,
    ) -> Result<Vec<SkillEntry>, BackendError> {
        let mut query = Vec::new();
        if let Some(t) = type_filter {
            query.push(("type", t.as_str().to_string()));
        }
        self.get_json(&format!("/users/{user_id}/skills"), &query)
            .await
    }

    async fn add_user_skill(
        &self,
        user_id: &str,
        skill_name: &str,
        skill_type: SkillType,
        proficiency: Proficiency,
        description: Option<&str>,
    ) -> Result<(), BackendError> {
        self.post_unit(
            &format!("/users/{user_id}/skills"),
            &json!({
                "skill_name": skill_name,
                "skill_type": skill_type,
                "proficiency": proficiency,
                "description": description,
            }),
        )
        .await
    }

    async fn remove_user_skill(
        &self,
        user_id: &str,
        skill_name: &str,
        skill_type: SkillType,
    ) -> Result<(), BackendError> {
        self.delete_unit(
            &format!("/users/{user_id}/skills"),
            &json!({ "skill_name": skill_name, "skill_type": skill_type }),
        )
        .await
    }

    async fn create_barter_request(
        &self,
        sender_id: &str,
        receiver_id: &str,
        offered_skill: &str,
        requested_skill: &str,
        message: &str,
    ) -> Result<String, BackendError> {
        let created: CreatedRequest = self
            .post_json(
                "/requests",
                &json!({
                    "sender_id": sender_id,
                    "receiver_id": receiver_id,
                    "offered_skill": offered_skill,
                    "requested_skill": requested_skill,
                    "message": message,
                }),
            )
            .await?;
        Ok(created.request_id)
    }

    async fn get_user_requests(&self, user_id: &str) -> Result<Vec<BarterRequest>, BackendError> {
        self.get_json(&format!("/users/{user_id}/requests"), &[])
            .await
    }

    async fn get_request(&self, request_id: &str) -> Result<BarterRequest, BackendError> {
        self.get_json(&format!("/requests/{request_id}"), &[]).await
    }

    async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), BackendError> {
        self.patch_unit(
            &format!("/requests/{request_id}"),
            &json!({ "status": status }),
        )
        .await
    }

    async fn get_user_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<Transaction>, BackendError> {
        self.get_json(&format!("/users/{user_id}/transactions"), &[])
            .await
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), BackendError> {
        self.post_unit("/transactions", transaction).await
    }

    async fn create_system_message(
        &self,
        author_id: &str,
        title: &str,
        message: &str,
        message_type: MessageType,
    ) -> Result<(), BackendError> {
        self.post_unit(
            "/messages",
            &json!({
                "author_id": author_id,
                "title": title,
                "message": message,
                "message_type": message_type,
            }),
        )
        .await
    }

    async fn get_active_messages(&self) -> Result<Vec<SystemMessage>, BackendError> {
        self.get_json("/messages/active", &[]).await
    }

    async fn get_all_skills(&self) -> Result<Vec<SkillAggregate>, BackendError> {
        self.get_json("/skills", &[]).await
    }
}

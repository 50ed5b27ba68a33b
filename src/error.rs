use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::{error_codes, error_to_api_response};

/// 认证与授权相关错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("未登录或登录已过期")]
    Unauthenticated,
    #[error("邮箱或密码错误")]
    InvalidCredentials,
    #[error("权限不足，需要管理员权限")]
    InsufficientRole,
}

/// 请求参数校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("缺少必填字段: {0}")]
    MissingField(&'static str),
    #[error("密码长度至少为6个字符")]
    PasswordTooShort,
    #[error("所选技能不在对方当前提供的技能列表中: {0}")]
    InvalidSkillSelection(String),
    #[error("你还没有添加任何可提供的技能")]
    NoSkillsAvailable,
    #[error("不能向自己发送交换请求")]
    SelfRequest,
}

/// 交换请求状态流转错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("只有请求的接收方可以处理该请求")]
    Forbidden,
    #[error("请求已处理，状态不可再变更")]
    InvalidTransition,
}

/// 外部后端调用错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("请求的数据不存在")]
    NotFound,
    #[error("数据冲突，目标记录已存在")]
    Conflict,
    #[error("后端服务暂时不可用")]
    Unavailable,
    #[error("后端服务错误: {0}")]
    Unknown(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> i32 {
        match self {
            AppError::Auth(AuthError::InsufficientRole) => error_codes::PERMISSION_DENIED,
            AppError::Auth(_) => error_codes::AUTH_FAILED,
            AppError::Validation(_) => error_codes::VALIDATION_ERROR,
            AppError::Transition(TransitionError::Forbidden) => error_codes::PERMISSION_DENIED,
            AppError::Transition(TransitionError::InvalidTransition) => {
                error_codes::INVALID_TRANSITION
            }
            AppError::Backend(BackendError::NotFound) => error_codes::NOT_FOUND,
            AppError::Backend(BackendError::Conflict) => error_codes::CONFLICT,
            AppError::Backend(BackendError::Unavailable) => error_codes::BACKEND_UNAVAILABLE,
            AppError::Backend(BackendError::Unknown(_)) => error_codes::INTERNAL_ERROR,
            AppError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::InsufficientRole) => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Transition(TransitionError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Transition(TransitionError::InvalidTransition) => StatusCode::CONFLICT,
            AppError::Backend(BackendError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Backend(BackendError::Conflict) => StatusCode::CONFLICT,
            AppError::Backend(BackendError::Unavailable) => StatusCode::BAD_GATEWAY,
            AppError::Backend(BackendError::Unknown(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status(),
            error_to_api_response::<()>(self.code(), self.to_string()),
        )
            .into_response()
    }
}

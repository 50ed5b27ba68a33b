use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{AppState, middleware::auth_middleware, routes};

// 公开路由：注册、登录、浏览社区
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(routes::user::register))
        .route("/users/login", post(routes::user::login))
        .route("/users/browse", get(routes::user::browse))
}

// 需要认证的路由，管理端接口在各自 handler 里再做角色门禁
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // 用户与会话
        .route("/users/me", get(routes::user::current_profile))
        .route("/users/update-profile", put(routes::user::update_profile))
        .route("/users/refresh-profile", post(routes::user::refresh_profile))
        .route("/users/logout", post(routes::user::logout))
        // 技能
        .route("/skills/add", post(routes::skill::add_skill))
        .route("/skills/remove", post(routes::skill::remove_skill))
        .route("/skills/list", get(routes::skill::list_skills))
        // 交换请求
        .route("/swaps/create", post(routes::swap::create_request))
        .route("/swaps/list", get(routes::swap::list_requests))
        .route("/swaps/update-status", post(routes::swap::update_status))
        // 交易与公告
        .route(
            "/transactions/list",
            get(routes::transaction::list_transactions),
        )
        .route("/messages/active", get(routes::message::active_messages))
        // 管理端
        .route("/admin/users", get(routes::admin::list_users))
        .route("/admin/users/ban", post(routes::admin::ban_user))
        .route("/admin/users/unban", post(routes::admin::unban_user))
        .route("/admin/users/set-role", post(routes::admin::set_role))
        .route("/admin/messages/create", post(routes::admin::create_message))
        .route("/admin/stats", get(routes::admin::platform_stats))
        .route("/admin/skills-report", get(routes::admin::skills_report))
        .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}

/// 组装完整路由，挂在配置的 API 前缀下
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()));

    Router::new()
        .nest(&state.config.api_base_uri.clone(), api)
        .with_state(state)
}

use std::sync::Arc;

use backend::client::SkillSwapBackend;
use config::Config;
use session::SessionStore;

pub mod backend;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod session;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SkillSwapBackend>,
    pub sessions: SessionStore,
    pub config: Config,
}

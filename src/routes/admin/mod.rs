mod handler;
mod model;

pub use handler::{
    ban_user, create_message, list_users, platform_stats, set_role, skills_report, unban_user,
};

mod handler;
mod model;

pub use handler::{add_skill, list_skills, remove_skill};

mod handler;
mod model;

pub use handler::{
    browse, current_profile, login, logout, refresh_profile, register, update_profile,
};

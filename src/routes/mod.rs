pub mod admin;
pub mod message;
pub mod skill;
pub mod swap;
pub mod transaction;
pub mod user;

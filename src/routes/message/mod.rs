mod handler;

pub use handler::active_messages;

mod handler;
mod model;

pub use handler::{create_request, list_requests, update_status};

pub mod client;
pub mod http;
pub mod memory;
pub mod types;

pub mod config;
pub mod slug;
pub mod types;

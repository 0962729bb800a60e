pub mod config;
mod context;
pub mod daemon;
pub mod link;
mod prompts;
pub mod sync;
mod sync_ui;
pub mod users;

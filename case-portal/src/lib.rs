pub mod api;
pub mod config;
pub mod guard;
pub mod session;

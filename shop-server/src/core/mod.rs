//! Core: configuration, shared state, server lifecycle
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - handles shared by all handlers
//! - [`Server`] - HTTP listener

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;

//! Execution modes
//!
//! - Server mode (HTTP server, default)
//! - CLI mode (config helpers)

pub mod cli;
pub mod server;

pub use cli::run_config_command;
pub use server::run_server;

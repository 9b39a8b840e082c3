//! CLI module for the `careline` binary

pub mod commands;
pub mod handlers;

pub use commands::*;
pub use handlers::*;

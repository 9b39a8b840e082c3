//! REST API for the intake dialogue, knowledge search, and form extraction

pub mod handlers;
pub mod routes;
pub mod server;
pub mod session;
pub mod types;

pub use server::serve_api;
pub use session::SessionManager;

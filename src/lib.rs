pub mod api;
pub mod cli;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod forms;
pub mod kb;
pub mod llm;
pub mod logging;
pub mod models;
pub mod ocr;
pub mod rag;

pub use config::AppConfig;
pub use errors::*;

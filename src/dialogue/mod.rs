//! Scripted slot-filling intake dialogue

pub mod engine;
pub mod language;
pub mod messages;

pub use engine::DialogueEngine;
pub use engine::DialogueSession;
pub use messages::MessageKey;

//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::models::DialoguePhase;
use crate::ocr::WordConfidence;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub kb_passages: usize,
    pub active_sessions: usize,
}

/// New dialogue session: its id plus the greeting messages
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub messages: Vec<String>,
}

/// One user message into an existing session
#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    pub message: String,
}

/// Assistant replies plus the phase the session landed in
#[derive(Debug, Serialize)]
pub struct SubmitMessageResponse {
    pub messages: Vec<String>,
    pub phase: DialoguePhase,
}

/// Collected profile for a session
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub session_id: String,
    pub phase: DialoguePhase,
    pub language: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub id_number: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub hmo_name: Option<String>,
    pub hmo_card_number: Option<String>,
    pub insurance_tier: Option<String>,
}

/// Knowledge base search request
#[derive(Debug, Deserialize)]
pub struct KbSearchRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    4
}

/// One scored passage in a search response
#[derive(Debug, Serialize)]
pub struct PassageResponse {
    pub id: String,
    pub source_file: String,
    pub paragraph_index: usize,
    pub text: String,
    pub score: f32,
}

/// Form extraction response
#[derive(Debug, Serialize)]
pub struct FormExtractionResponse {
    pub fields: serde_json::Value,
    pub fields_en: serde_json::Value,
    pub low_confidence_words: Vec<WordConfidence>,
}

//! API request handlers

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::types::*;
use crate::api::session::SessionManager;
use crate::dialogue::DialogueEngine;
use crate::forms::FormPipeline;
use crate::kb::KnowledgeIndex;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DialogueEngine>,
    pub sessions: Arc<SessionManager>,
    pub index: Arc<KnowledgeIndex>,
    pub forms: Arc<FormPipeline>,
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        kb_passages: state.index.len(),
        active_sessions: state.sessions.session_count(),
    }))
}

/// Start a new dialogue session
pub async fn start_session(
    State(state): State<AppState>,
) -> Json<ApiResponse<StartSessionResponse>> {
    let (session, messages) = state.engine.start();
    let session_id = session.id.clone();
    state.sessions.insert(session);

    info!("POST /api/sessions -> {}", session_id);
    Json(ApiResponse::success(StartSessionResponse {
        session_id,
        messages,
    }))
}

/// Submit a user message to an existing session
pub async fn submit_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitMessageRequest>,
) -> Result<Json<ApiResponse<SubmitMessageResponse>>, StatusCode> {
    info!("POST /api/sessions/{}/messages", session_id);

    let Some(mut session) = state.sessions.get(&session_id) else {
        return Err(StatusCode::NOT_FOUND);
    };

    let messages = state.engine.submit(&mut session, &req.message).await;
    let phase = session.phase;
    state.sessions.update(session);

    Ok(Json(ApiResponse::success(SubmitMessageResponse {
        messages,
        phase,
    })))
}

/// Read the profile collected so far for a session
pub async fn get_profile(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<ProfileResponse>>, StatusCode> {
    info!("GET /api/sessions/{}/profile", session_id);

    let Some(session) = state.sessions.get(&session_id) else {
        return Err(StatusCode::NOT_FOUND);
    };

    let profile = &session.profile;
    Ok(Json(ApiResponse::success(ProfileResponse {
        session_id: session.id.clone(),
        phase: session.phase,
        language: profile.language.code().to_string(),
        first_name: profile.first_name.clone(),
        last_name: profile.last_name.clone(),
        id_number: profile.id_number.clone(),
        gender: profile.gender.clone(),
        age: profile.age.clone(),
        hmo_name: profile.hmo_name.clone(),
        hmo_card_number: profile.hmo_card_number.clone(),
        insurance_tier: profile.insurance_tier.clone(),
    })))
}

/// Delete a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    info!("DELETE /api/sessions/{}", session_id);

    if state.sessions.get(&session_id).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }

    state.sessions.delete(&session_id);
    Ok(Json(ApiResponse::success("deleted".to_string())))
}

/// Search the knowledge base directly
pub async fn kb_search(
    State(state): State<AppState>,
    Json(req): Json<KbSearchRequest>,
) -> Json<ApiResponse<Vec<PassageResponse>>> {
    info!("POST /api/kb/search: {}", req.query);

    let results = state.index.search(&req.query, req.limit).await;
    let response: Vec<PassageResponse> = results
        .into_iter()
        .map(|r| PassageResponse {
            id: r.passage.id,
            source_file: r.passage.source_file,
            paragraph_index: r.passage.paragraph_index,
            text: r.passage.text,
            score: r.score,
        })
        .collect();

    Json(ApiResponse::success(response))
}

/// OCR a form document and extract its fields
pub async fn extract_form(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<FormExtractionResponse>>, StatusCode> {
    info!("POST /api/forms/extract ({} bytes)", body.len());

    if body.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.forms.extract(&body).await {
        Ok(extraction) => Ok(Json(ApiResponse::success(FormExtractionResponse {
            fields: extraction.fields,
            fields_en: extraction.fields_en,
            low_confidence_words: extraction.low_confidence_words,
        }))),
        Err(e) => {
            error!("Form extraction failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

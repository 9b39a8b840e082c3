//! OCR collaborator contract and the Azure Document Intelligence client

pub mod azure;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use azure::DocumentIntelligence;

use crate::errors::Result;

/// One recognized word with its OCR confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordConfidence {
    pub text: String,
    pub confidence: f64,
}

/// Full OCR result: page text plus per-word confidences
#[derive(Debug, Clone, Default)]
pub struct OcrOutcome {
    pub text: String,
    pub words: Vec<WordConfidence>,
}

/// Document OCR collaborator.
///
/// Failures are explicit `Result` errors, never sentinel strings.
#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn analyze(&self, document: &[u8]) -> Result<OcrOutcome>;
}

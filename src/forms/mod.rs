//! National-Insurance form extraction: OCR text to structured JSON

pub mod parser;
pub mod template;

use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::ocr::OcrClient;

pub use parser::FormExtraction;
pub use parser::FormParser;

/// End-to-end form pipeline: OCR the document, then parse the recognized
/// text into the structured field template.
pub struct FormPipeline {
    ocr: Arc<dyn OcrClient>,
    parser: FormParser,
}

impl FormPipeline {
    pub fn new(ocr: Arc<dyn OcrClient>, parser: FormParser) -> Self {
        Self { ocr, parser }
    }

    pub async fn extract(&self, document: &[u8]) -> Result<FormExtraction> {
        let outcome = self.ocr.analyze(document).await?;
        info!(
            "OCR produced {} characters, {} words",
            outcome.text.len(),
            outcome.words.len()
        );

        self.parser.parse(&outcome.text, &outcome.words).await
    }
}

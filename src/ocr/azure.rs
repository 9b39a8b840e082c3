//! Azure Document Intelligence client (prebuilt-layout model)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tracing::info;

use crate::config::DocumentIntelligenceConfig;
use crate::errors::CarelineError;
use crate::errors::Result;
use crate::ocr::OcrClient;
use crate::ocr::OcrOutcome;
use crate::ocr::WordConfidence;

/// Client for the Document Intelligence analyze REST flow: submit the
/// document, then poll the `Operation-Location` URL until the analysis
/// completes or the attempt budget runs out.
pub struct DocumentIntelligence {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    poll_interval: std::time::Duration,
    max_poll_attempts: u32,
}

impl DocumentIntelligence {
    pub fn from_config(config: &DocumentIntelligenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| CarelineError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            poll_interval: std::time::Duration::from_millis(config.poll_interval_ms),
            max_poll_attempts: config.max_poll_attempts,
        })
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/documentintelligence/documentModels/prebuilt-layout:analyze?api-version={}",
            self.endpoint, self.api_version
        )
    }

    async fn begin_analyze(&self, document: &[u8]) -> Result<String> {
        let response = self
            .client
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(document.to_vec())
            .send()
            .await
            .map_err(|e| CarelineError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CarelineError::Ocr(format!(
                "Document Intelligence API error ({status}): {error_text}"
            )));
        }

        response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
            .ok_or_else(|| {
                CarelineError::Ocr("No Operation-Location header in analyze response".to_string())
            })
    }

    async fn poll_result(&self, operation_url: &str) -> Result<AnalyzeResult> {
        for attempt in 0..self.max_poll_attempts {
            tokio::time::sleep(self.poll_interval).await;

            let response = self
                .client
                .get(operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.api_key)
                .send()
                .await
                .map_err(|e| CarelineError::Http(e.to_string()))?;

            let status: OperationStatus = response
                .json()
                .await
                .map_err(|e| CarelineError::Ocr(format!("Failed to parse poll response: {e}")))?;

            debug!("OCR poll attempt {}: {}", attempt + 1, status.status);

            match status.status.as_str() {
                "succeeded" => {
                    return status.analyze_result.ok_or_else(|| {
                        CarelineError::Ocr("Succeeded operation without a result".to_string())
                    });
                }
                "failed" => {
                    return Err(CarelineError::Ocr(
                        "Document analysis reported failure".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Err(CarelineError::Ocr("OCR processing timeout".to_string()))
    }
}

#[async_trait]
impl OcrClient for DocumentIntelligence {
    async fn analyze(&self, document: &[u8]) -> Result<OcrOutcome> {
        info!("Submitting document for OCR analysis ({} bytes)", document.len());

        let operation_url = self.begin_analyze(document).await?;
        let result = self.poll_result(&operation_url).await?;

        let mut page_texts = Vec::new();
        let mut words = Vec::new();

        for page in result.pages {
            let lines: Vec<String> = page.lines.into_iter().map(|l| l.content).collect();
            page_texts.push(lines.join("\n"));

            words.extend(page.words.into_iter().map(|w| WordConfidence {
                text: w.content,
                confidence: w.confidence,
            }));
        }

        Ok(OcrOutcome {
            text: page_texts.join("\n"),
            words,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
    #[serde(rename = "analyzeResult")]
    analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    lines: Vec<Line>,
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Debug, Deserialize)]
struct Line {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Word {
    content: String,
    confidence: f64,
}

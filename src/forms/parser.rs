//! OCR text to structured JSON via the chat collaborator

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::error;
use tracing::warn;

use crate::errors::Result;
use crate::forms::template;
use crate::llm::ChatClient;
use crate::llm::ChatMessage;
use crate::llm::CompletionRequest;
use crate::ocr::WordConfidence;

/// OCR words whose confidence falls below this are flagged for review
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.75;

/// Structured result of a form extraction
#[derive(Debug, Clone, Serialize)]
pub struct FormExtraction {
    /// Extracted fields with the form's original Hebrew keys
    pub fields: Value,
    /// Same fields with English keys for UI presentation
    pub fields_en: Value,
    /// Extracted words the OCR engine was unsure about
    pub low_confidence_words: Vec<WordConfidence>,
}

/// Turns recognized form text into the structured field template using the
/// chat collaborator as a JSON extraction engine.
pub struct FormParser {
    chat: Arc<dyn ChatClient>,
}

impl FormParser {
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self { chat }
    }

    pub async fn parse(
        &self,
        ocr_text: &str,
        word_confidences: &[WordConfidence],
    ) -> Result<FormExtraction> {
        let prompt = extraction_prompt(ocr_text)?;
        let request = CompletionRequest::new("You are a JSON extraction expert.")
            .with_message(ChatMessage::user(prompt))
            .with_temperature(0.0)
            .with_max_tokens(1000);

        let reply = self.chat.complete(request).await?;
        let cleaned = strip_code_fences(&reply);

        let mut fields = match serde_json::from_str::<Value>(cleaned) {
            Ok(value) if value.is_object() => value,
            Ok(_) | Err(_) => {
                error!("Failed to parse extraction reply as JSON, returning empty template");
                template::empty_template()
            }
        };

        ensure_template_keys(&mut fields);

        let low_confidence_words =
            low_confidence_words(&fields, word_confidences, LOW_CONFIDENCE_THRESHOLD);
        if !low_confidence_words.is_empty() {
            warn!(
                "{} extracted word(s) below OCR confidence threshold",
                low_confidence_words.len()
            );
        }

        let fields_en = template::translate_to_english(&fields);

        Ok(FormExtraction {
            fields,
            fields_en,
            low_confidence_words,
        })
    }
}

fn extraction_prompt(ocr_text: &str) -> Result<String> {
    let template_json = serde_json::to_string_pretty(&template::empty_template())?;

    Ok(format!(
        "You are an expert in extracting structured data from OCR text.\n\
         The following text was extracted from a National Insurance Institute form, \
         possibly in Hebrew or English.\n\n\
         Please extract the fields and format them into valid JSON:\n{template_json}\n\n\
         If any field is missing, return an empty string.\n\n\
         Here is the extracted text:\n{text}\n\n\
         Respond ONLY with the JSON object (no explanations).",
        text = clean_text(ocr_text)
    ))
}

/// Collapse whitespace runs so the prompt carries the text in a single block
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove a surrounding Markdown code fence from the collaborator's reply
pub fn strip_code_fences(reply: &str) -> &str {
    let mut text = reply.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the fence line including any language tag
        text = rest.split_once('\n').map_or("", |(_, body)| body);
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Fill any template key the collaborator dropped with its empty value
fn ensure_template_keys(fields: &mut Value) {
    let template = template::empty_template();
    let (Some(out), Some(template_map)) = (fields.as_object_mut(), template.as_object()) else {
        return;
    };

    for (key, empty_value) in template_map {
        if !out.contains_key(key) {
            out.insert(key.clone(), empty_value.clone());
        }
    }
}

/// Words that appear in the extracted JSON values and fell below the OCR
/// confidence threshold
fn low_confidence_words(
    fields: &Value,
    word_confidences: &[WordConfidence],
    threshold: f64,
) -> Vec<WordConfidence> {
    let mut value_words = HashSet::new();
    collect_value_words(fields, &mut value_words);

    word_confidences
        .iter()
        .filter(|wc| wc.confidence < threshold && value_words.contains(wc.text.as_str()))
        .cloned()
        .collect()
}

fn collect_value_words<'a>(value: &'a Value, words: &mut HashSet<&'a str>) {
    match value {
        Value::String(s) => {
            words.extend(
                s.split(|c: char| !c.is_alphanumeric())
                    .filter(|w| !w.is_empty()),
            );
        }
        Value::Object(map) => {
            for v in map.values() {
                collect_value_words(v, words);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_value_words(v, words);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct ScriptedChat {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatClient for ScriptedChat {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn parser_with_reply(reply: &str) -> FormParser {
        FormParser::new(Arc::new(ScriptedChat {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }))
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("a\n\nb   c\t d"), "a b c d");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[tokio::test]
    async fn test_parse_fills_missing_template_keys() {
        let parser = parser_with_reply(r#"{"שם פרטי": "דוד"}"#);
        let extraction = parser.parse("some text", &[]).await.unwrap();

        let map = extraction.fields.as_object().unwrap();
        assert_eq!(map["שם פרטי"], "דוד");
        // Dropped keys come back as template empties
        assert_eq!(map["שם משפחה"], "");
        assert!(map["כתובת"].is_object());

        // English projection carries the value under the translated key
        assert_eq!(extraction.fields_en["firstName"], "דוד");
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back_to_template() {
        let parser = parser_with_reply("I could not find any fields, sorry!");
        let extraction = parser.parse("some text", &[]).await.unwrap();

        assert_eq!(extraction.fields, template::empty_template());
    }

    #[tokio::test]
    async fn test_low_confidence_words_reported() {
        let parser = parser_with_reply(r#"{"שם פרטי": "David", "מספר זהות": "123456789"}"#);
        let words = vec![
            WordConfidence {
                text: "David".to_string(),
                confidence: 0.42,
            },
            WordConfidence {
                text: "123456789".to_string(),
                confidence: 0.99,
            },
            WordConfidence {
                text: "unrelated".to_string(),
                confidence: 0.10,
            },
        ];

        let extraction = parser.parse("text", &words).await.unwrap();

        assert_eq!(extraction.low_confidence_words.len(), 1);
        assert_eq!(extraction.low_confidence_words[0].text, "David");
    }

    #[test]
    fn test_low_confidence_matches_words_inside_values() {
        let fields = json!({"תיאור התאונה": "fell from ladder"});
        let words = vec![WordConfidence {
            text: "ladder".to_string(),
            confidence: 0.5,
        }];

        let flagged = low_confidence_words(&fields, &words, 0.75);
        assert_eq!(flagged.len(), 1);
    }
}

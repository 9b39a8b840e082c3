//! Binary language detection for the greeting message

use crate::models::Language;

/// Detect the session language from the user's first free-text message.
///
/// A two-way split is all that is needed: any Hebrew-script character makes
/// the session Hebrew, everything else defaults to English.
pub fn detect(text: &str) -> Language {
    if text.chars().any(is_hebrew) {
        Language::He
    } else {
        Language::En
    }
}

fn is_hebrew(c: char) -> bool {
    ('\u{0590}'..='\u{05FF}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hebrew_text_detected() {
        assert_eq!(detect("שלום, מה שלומך?"), Language::He);
    }

    #[test]
    fn test_english_text_detected() {
        assert_eq!(detect("Hello, I'm fine thanks"), Language::En);
    }

    #[test]
    fn test_mixed_text_prefers_hebrew() {
        assert_eq!(detect("hi שלום"), Language::He);
    }

    #[test]
    fn test_empty_and_numeric_default_to_english() {
        assert_eq!(detect(""), Language::En);
        assert_eq!(detect("123456789"), Language::En);
    }
}

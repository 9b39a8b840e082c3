//! Core data model: passages, user profile, dialogue phases

use serde::Deserialize;
use serde::Serialize;

/// Accepted health fund names (Hebrew, as they appear in the knowledge base)
pub const HMO_NAMES: [&str; 3] = ["מכבי", "מאוחדת", "כללית"];

/// Accepted insurance tiers (gold, silver, bronze)
pub const INSURANCE_TIERS: [&str; 3] = ["זהב", "כסף", "ארד"];

/// A single retrievable unit of knowledge-base text with source metadata.
///
/// Immutable once created; passages live for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passage {
    pub id: String,
    pub text: String,
    pub source_file: String,
    pub paragraph_index: usize,
}

impl Passage {
    pub fn new(source_file: &str, paragraph_index: usize, text: String) -> Self {
        Self {
            id: format!("{source_file}_para_{paragraph_index}"),
            text,
            source_file: source_file.to_string(),
            paragraph_index,
        }
    }
}

/// A passage paired with its similarity score for a query
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

/// Response language for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    He,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::He => "he",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::He => "Hebrew",
        }
    }
}

/// Profile fields collected by the intake dialogue, in collection order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
    IdNumber,
    Gender,
    Age,
    HmoName,
    HmoCardNumber,
    InsuranceTier,
}

impl ProfileField {
    /// Parse the snake_case field key used by the edit-intent collaborator
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "first_name" => Some(Self::FirstName),
            "last_name" => Some(Self::LastName),
            "id_number" => Some(Self::IdNumber),
            "gender" => Some(Self::Gender),
            "age" => Some(Self::Age),
            "hmo_name" => Some(Self::HmoName),
            "hmo_card_number" => Some(Self::HmoCardNumber),
            "insurance_tier" => Some(Self::InsuranceTier),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::IdNumber => "id_number",
            Self::Gender => "gender",
            Self::Age => "age",
            Self::HmoName => "hmo_name",
            Self::HmoCardNumber => "hmo_card_number",
            Self::InsuranceTier => "insurance_tier",
        }
    }

    /// Human-readable label used in prompts and error messages
    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::IdNumber => "ID number",
            Self::Gender => "gender",
            Self::Age => "age",
            Self::HmoName => "HMO name",
            Self::HmoCardNumber => "HMO card number",
            Self::InsuranceTier => "insurance membership tier",
        }
    }

    /// Check a candidate value against the field's canonical format.
    ///
    /// Free-text fields only require a non-empty value; format fields apply
    /// the same rule on both the fast path and re-validation of extracted
    /// values.
    pub fn validate(self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Self::FirstName | Self::LastName | Self::Gender => !value.is_empty(),
            Self::IdNumber | Self::HmoCardNumber => is_nine_digits(value),
            Self::Age => is_valid_age(value),
            Self::HmoName => HMO_NAMES.contains(&value),
            Self::InsuranceTier => INSURANCE_TIERS.contains(&value),
        }
    }

    /// Whether failed local validation should fall back to the extraction
    /// collaborator
    pub fn has_extraction_fallback(self) -> bool {
        matches!(
            self,
            Self::IdNumber | Self::Age | Self::HmoName | Self::HmoCardNumber | Self::InsuranceTier
        )
    }
}

/// Exactly 9 ASCII digits (ID and HMO card numbers)
pub fn is_nine_digits(value: &str) -> bool {
    value.len() == 9 && value.chars().all(|c| c.is_ascii_digit())
}

/// An integer in [0, 120]
pub fn is_valid_age(value: &str) -> bool {
    value.parse::<i64>().is_ok_and(|age| (0..=120).contains(&age))
}

/// User profile collected by the slot-filling dialogue.
///
/// Fields are filled one at a time in collection order and are read-only once
/// the dialogue reaches question answering, except for explicit edits made in
/// the confirmation phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub id_number: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub hmo_name: Option<String>,
    pub hmo_card_number: Option<String>,
    pub insurance_tier: Option<String>,
    pub language: Language,
}

impl UserProfile {
    pub fn set(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::FirstName => self.first_name = Some(value),
            ProfileField::LastName => self.last_name = Some(value),
            ProfileField::IdNumber => self.id_number = Some(value),
            ProfileField::Gender => self.gender = Some(value),
            ProfileField::Age => self.age = Some(value),
            ProfileField::HmoName => self.hmo_name = Some(value),
            ProfileField::HmoCardNumber => self.hmo_card_number = Some(value),
            ProfileField::InsuranceTier => self.insurance_tier = Some(value),
        }
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::FirstName => self.first_name.as_deref(),
            ProfileField::LastName => self.last_name.as_deref(),
            ProfileField::IdNumber => self.id_number.as_deref(),
            ProfileField::Gender => self.gender.as_deref(),
            ProfileField::Age => self.age.as_deref(),
            ProfileField::HmoName => self.hmo_name.as_deref(),
            ProfileField::HmoCardNumber => self.hmo_card_number.as_deref(),
            ProfileField::InsuranceTier => self.insurance_tier.as_deref(),
        }
    }

    /// One-line summary of the collected details for the confirmation prompt
    pub fn summary(&self) -> String {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        format!(
            "first_name: {}, last_name: {}, id_number: {}, gender: {}, age: {}, hmo_name: {}, hmo_card_number: {}, insurance_tier: {}",
            value(&self.first_name),
            value(&self.last_name),
            value(&self.id_number),
            value(&self.gender),
            value(&self.age),
            value(&self.hmo_name),
            value(&self.hmo_card_number),
            value(&self.insurance_tier),
        )
    }
}

/// Phases of the intake dialogue.
///
/// Transitions are strictly forward; `Confirm` loops on edits and
/// `QuestionAnswering` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    Greeting,
    AskFirstName,
    AskLastName,
    AskIdNumber,
    AskGender,
    AskAge,
    AskHmoName,
    AskHmoCardNumber,
    AskInsuranceTier,
    Confirm,
    QuestionAnswering,
}

impl DialoguePhase {
    /// The field collected in this phase, if any
    pub fn field(self) -> Option<ProfileField> {
        match self {
            Self::AskFirstName => Some(ProfileField::FirstName),
            Self::AskLastName => Some(ProfileField::LastName),
            Self::AskIdNumber => Some(ProfileField::IdNumber),
            Self::AskGender => Some(ProfileField::Gender),
            Self::AskAge => Some(ProfileField::Age),
            Self::AskHmoName => Some(ProfileField::HmoName),
            Self::AskHmoCardNumber => Some(ProfileField::HmoCardNumber),
            Self::AskInsuranceTier => Some(ProfileField::InsuranceTier),
            Self::Greeting | Self::Confirm | Self::QuestionAnswering => None,
        }
    }

    /// Next phase in the fixed field order
    pub fn next(self) -> Self {
        match self {
            Self::Greeting => Self::AskFirstName,
            Self::AskFirstName => Self::AskLastName,
            Self::AskLastName => Self::AskIdNumber,
            Self::AskIdNumber => Self::AskGender,
            Self::AskGender => Self::AskAge,
            Self::AskAge => Self::AskHmoName,
            Self::AskHmoName => Self::AskHmoCardNumber,
            Self::AskHmoCardNumber => Self::AskInsuranceTier,
            Self::AskInsuranceTier => Self::Confirm,
            Self::Confirm | Self::QuestionAnswering => Self::QuestionAnswering,
        }
    }
}

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// A single turn in the session transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_id_combines_file_and_index() {
        let passage = Passage::new("services.html", 3, "text".to_string());
        assert_eq!(passage.id, "services.html_para_3");
        assert_eq!(passage.paragraph_index, 3);
    }

    #[test]
    fn test_nine_digit_validation() {
        assert!(is_nine_digits("123456789"));
        assert!(!is_nine_digits("12345678"));
        assert!(!is_nine_digits("1234567890"));
        assert!(!is_nine_digits("12345678a"));
        assert!(!is_nine_digits(""));
    }

    #[test]
    fn test_age_validation() {
        assert!(is_valid_age("0"));
        assert!(is_valid_age("120"));
        assert!(is_valid_age("42"));
        assert!(!is_valid_age("121"));
        assert!(!is_valid_age("-1"));
        assert!(!is_valid_age("forty"));
    }

    #[test]
    fn test_enumerated_field_validation() {
        assert!(ProfileField::HmoName.validate("מכבי"));
        assert!(!ProfileField::HmoName.validate("Kaiser"));
        assert!(ProfileField::InsuranceTier.validate("זהב"));
        assert!(!ProfileField::InsuranceTier.validate("platinum"));
    }

    #[test]
    fn test_field_key_round_trip() {
        for field in [
            ProfileField::FirstName,
            ProfileField::LastName,
            ProfileField::IdNumber,
            ProfileField::Gender,
            ProfileField::Age,
            ProfileField::HmoName,
            ProfileField::HmoCardNumber,
            ProfileField::InsuranceTier,
        ] {
            assert_eq!(ProfileField::from_key(field.key()), Some(field));
        }
        assert_eq!(ProfileField::from_key("favorite_color"), None);
    }

    #[test]
    fn test_phase_order_ends_at_question_answering() {
        let mut phase = DialoguePhase::Greeting;
        for _ in 0..11 {
            phase = phase.next();
        }
        assert_eq!(phase, DialoguePhase::QuestionAnswering);
        // Absorbing state
        assert_eq!(phase.next(), DialoguePhase::QuestionAnswering);
    }
}

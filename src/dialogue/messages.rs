//! Localized (English/Hebrew) dialogue prompt catalog

use crate::models::DialoguePhase;
use crate::models::Language;

/// Scripted prompt keys, one per dialogue step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
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
    ConfirmInput,
    QaPhase,
    NoInformationFound,
}

impl MessageKey {
    /// The prompt emitted on entry to a phase
    pub fn for_phase(phase: DialoguePhase) -> Self {
        match phase {
            DialoguePhase::Greeting => Self::Greeting,
            DialoguePhase::AskFirstName => Self::AskFirstName,
            DialoguePhase::AskLastName => Self::AskLastName,
            DialoguePhase::AskIdNumber => Self::AskIdNumber,
            DialoguePhase::AskGender => Self::AskGender,
            DialoguePhase::AskAge => Self::AskAge,
            DialoguePhase::AskHmoName => Self::AskHmoName,
            DialoguePhase::AskHmoCardNumber => Self::AskHmoCardNumber,
            DialoguePhase::AskInsuranceTier => Self::AskInsuranceTier,
            DialoguePhase::Confirm => Self::Confirm,
            DialoguePhase::QuestionAnswering => Self::QaPhase,
        }
    }
}

/// Look up a scripted prompt in the session language
pub fn prompt(key: MessageKey, lang: Language) -> &'static str {
    match (key, lang) {
        (MessageKey::Greeting, Language::En) => {
            "Hello, I am your assistant. To provide you with the best support, let's begin by \
             collecting your personal details. How you are feeling today?"
        }
        (MessageKey::Greeting, Language::He) => {
            "שלום, אני העוזר האישי שלך. כדי לספק לך את השירות הטוב ביותר, נתחיל באיסוף פרטים אישיים. לפני כן, מה שלומך היום?"
        }
        (MessageKey::AskFirstName, Language::En) => {
            "Let's start by collecting your details. Please enter your first name."
        }
        (MessageKey::AskFirstName, Language::He) => {
            "בוא נתחיל באיסוף הפרטים שלך. אנא הזן/י את שמך הפרטי."
        }
        (MessageKey::AskLastName, Language::En) => "Great! Please enter your last name.",
        (MessageKey::AskLastName, Language::He) => "מצוין! אנא הזן/י את שם המשפחה שלך.",
        (MessageKey::AskIdNumber, Language::En) => "Please enter your ID number (9 digits).",
        (MessageKey::AskIdNumber, Language::He) => "אנא הזן/י את תעודת הזהות שלך (9 ספרות).",
        (MessageKey::AskGender, Language::En) => "Please enter your gender.",
        (MessageKey::AskGender, Language::He) => "אנא הזן/י את המגדר שלך.",
        (MessageKey::AskAge, Language::En) => "Please enter your age.",
        (MessageKey::AskAge, Language::He) => "אנא הזן/י את גילך.",
        (MessageKey::AskHmoName, Language::En) => {
            "Please enter your health fund. Options: מכבי, מאוחדת, כללית."
        }
        (MessageKey::AskHmoName, Language::He) => {
            "אנא הזן/י את קופת החולים שלך. אפשרויות: מכבי, מאוחדת, כללית."
        }
        (MessageKey::AskHmoCardNumber, Language::En) => {
            "Please enter your HMO card number (9 digits)."
        }
        (MessageKey::AskHmoCardNumber, Language::He) => {
            "אנא הזן/י את מספר כרטיס הקופה (9 ספרות)."
        }
        (MessageKey::AskInsuranceTier, Language::En) => {
            "Please enter your insurance tier. Options: זהב, כסף, ארד."
        }
        (MessageKey::AskInsuranceTier, Language::He) => {
            "אנא הזן/י את רמת הביטוח שלך. אפשרויות: זהב, כסף, ארד."
        }
        (MessageKey::Confirm, Language::En) => "Please confirm your details:",
        (MessageKey::Confirm, Language::He) => "אנא אשר/י את הפרטים שלך:",
        (MessageKey::ConfirmInput, Language::En) => {
            "Please type 'confirm' to proceed or explain which correction you'd like to make."
        }
        (MessageKey::ConfirmInput, Language::He) => {
            "אנא הקלד/י 'אשר' כדי להמשיך או תפרטי מה תרצי לשנות."
        }
        (MessageKey::QaPhase, Language::En) => {
            "How can I assist you? Please let me know your question or the topic you need help with."
        }
        (MessageKey::QaPhase, Language::He) => {
            "איך אני יכול לעזור לך? אנא ספר/י מה השאלה או הנושא שבו אתה זקוק לעזרה."
        }
        (MessageKey::NoInformationFound, Language::En) => {
            "Sorry, I couldn't find relevant information in the knowledge base."
        }
        (MessageKey::NoInformationFound, Language::He) => {
            "מצטער, לא מצאתי מידע רלוונטי במאגר הידע."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_both_languages() {
        let keys = [
            MessageKey::Greeting,
            MessageKey::AskFirstName,
            MessageKey::AskLastName,
            MessageKey::AskIdNumber,
            MessageKey::AskGender,
            MessageKey::AskAge,
            MessageKey::AskHmoName,
            MessageKey::AskHmoCardNumber,
            MessageKey::AskInsuranceTier,
            MessageKey::Confirm,
            MessageKey::ConfirmInput,
            MessageKey::QaPhase,
            MessageKey::NoInformationFound,
        ];

        for key in keys {
            assert!(!prompt(key, Language::En).is_empty());
            assert!(!prompt(key, Language::He).is_empty());
        }
    }
}

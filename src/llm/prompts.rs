//! Prompt templates for the chat collaborator

use crate::models::ProfileField;
use crate::models::UserProfile;

/// System prompt for extracting a single profile field from free text.
///
/// The instructions spell out the field's canonical format and ask for the
/// literal word `Invalid` when no valid value is present.
pub fn extraction_system_prompt(field: ProfileField) -> String {
    let mut prompt = format!(
        "You are an assistant that extracts a valid {name}. The expected format for {name} is: ",
        name = field.label()
    );

    let rules = match field {
        ProfileField::IdNumber => {
            "a valid ID number is exactly 9 digits long. \
             If the input contains multiple numbers, extract the one that is exactly 9 digits. \
             If no valid 9-digit number is found, return 'Invalid'."
        }
        ProfileField::Age => {
            "a valid age is an integer between 0 and 120. \
             If the input contains additional text, extract the integer value. \
             If no valid age is found, return 'Invalid'."
        }
        ProfileField::HmoName => {
            "a valid HMO name is one of the following: מכבי, מאוחדת, כללית. \
             If the input is not one of these, return 'Invalid'."
        }
        ProfileField::HmoCardNumber => {
            "a valid HMO card number is exactly 9 digits long. \
             If the input contains multiple numbers, extract the one that is exactly 9 digits. \
             If no valid 9-digit number is found, return 'Invalid'."
        }
        ProfileField::InsuranceTier => {
            "a valid insurance membership tier is one of the following: זהב, כסף, ארד. \
             If the input is not one of these, return 'Invalid'."
        }
        // Free-text fields never reach the extraction collaborator
        ProfileField::FirstName | ProfileField::LastName | ProfileField::Gender => {
            "any non-empty text."
        }
    };

    prompt.push_str(rules);
    prompt
}

/// User message wrapping the raw input for field extraction
pub fn extraction_user_message(field: ProfileField, input: &str) -> String {
    format!(
        "Extract the valid {} from the following input: '{}'.",
        field.label(),
        input
    )
}

/// System prompt for classifying a confirmation-phase response as either a
/// literal confirm or a structured edit instruction
pub fn confirmation_system_prompt() -> String {
    "You are an assistant that analyzes a user's response regarding confirmation of their details. \
     The user input can be in English or Hebrew. \
     The available fields in the user data are: first_name, last_name, id_number, gender, age, \
     hmo_name, hmo_card_number, insurance_tier. \
     If the response indicates that the user wants to proceed, respond with the single word 'confirm'. \
     If the response indicates that the user wants to make corrections, respond with a JSON object \
     in the following format: \
     {\"action\": \"edit\", \"field\": \"<field_name>\", \"new_value\": \"<new_value>\"} \
     Make sure the JSON is valid. Only output either 'confirm' or the JSON object."
        .to_string()
}

/// One-shot example pair steering the confirmation classifier toward the
/// structured edit format
pub fn confirmation_example() -> (String, String) {
    (
        "תשנה את המגדר שלי לזכר".to_string(),
        "{\"action\": \"edit\", \"field\": \"gender\", \"new_value\": \"זכר\"}".to_string(),
    )
}

/// System prompt for answer synthesis, scoped to the user's fund and tier and
/// the session language
pub fn answer_system_prompt(profile: &UserProfile) -> String {
    format!(
        "You are a helpful chatbot that answers questions about Israeli health funds \
         (Maccabi, Meuhedet, and Clalit). \
         Your response should be based on the provided knowledge base, which includes general \
         information shared across all health funds, followed by a table with specific details \
         for each health fund and their respective insurance tiers. \
         The file will also include contact numbers for each health fund. \
         Always provide an answer based solely on the user's selected health fund ({hmo}), \
         and their insurance tier ({tier}). \
         Answer in {language}.",
        hmo = profile.hmo_name.as_deref().unwrap_or(""),
        tier = profile.insurance_tier.as_deref().unwrap_or(""),
        language = profile.language.english_name(),
    )
}

/// User message combining profile context, retrieved passages, and the
/// question for answer synthesis
pub fn answer_user_message(profile: &UserProfile, context: &str, question: &str) -> String {
    format!(
        "User Info: {}\nRelevant Info:\n{}\n\nUser Question: {}",
        profile.summary(),
        context,
        question
    )
}

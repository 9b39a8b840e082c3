//! The National-Insurance form field template and its English key mapping

use serde_json::json;
use serde_json::Value;

/// Empty extraction template (Hebrew field names, as printed on the form).
///
/// The extraction prompt embeds this structure and the parser falls back to
/// it when the collaborator's reply cannot be parsed.
pub fn empty_template() -> Value {
    json!({
        "שם משפחה": "",
        "שם פרטי": "",
        "מספר זהות": "",
        "מין": "",
        "תאריך לידה": {"יום": "", "חודש": "", "שנה": ""},
        "כתובת": {
            "רחוב": "", "מספר בית": "", "כניסה": "",
            "דירה": "", "ישוב": "", "מיקוד": "", "תא דואר": ""
        },
        "טלפון קווי": "",
        "טלפון נייד": "",
        "סוג העבודה": "",
        "תאריך הפגיעה": {"יום": "", "חודש": "", "שנה": ""},
        "שעת הפגיעה": "",
        "מקום התאונה": "",
        "כתובת מקום התאונה": "",
        "תיאור התאונה": "",
        "האיבר שנפגע": "",
        "חתימה": "",
        "תאריך מילוי הטופס": {"יום": "", "חודש": "", "שנה": ""},
        "תאריך קבלת הטופס בקופה": {"יום": "", "חודש": "", "שנה": ""},
        "למילוי ע\"י המוסד הרפואי": {
            "חבר בקופת חולים": "", "מהות התאונה": "", "אבחנות רפואיות": ""
        }
    })
}

/// Translate a Hebrew form key to its English UI name; unknown keys pass
/// through unchanged.
pub fn translate_key(key: &str) -> &str {
    match key {
        "שם משפחה" => "lastName",
        "שם פרטי" => "firstName",
        "מספר זהות" => "idNumber",
        "מין" => "gender",
        "תאריך לידה" => "dateOfBirth",
        "יום" => "day",
        "חודש" => "month",
        "שנה" => "year",
        "כתובת" => "address",
        "רחוב" => "street",
        "מספר בית" => "houseNumber",
        "כניסה" => "entrance",
        "דירה" => "apartment",
        "ישוב" => "city",
        "מיקוד" => "postalCode",
        "תא דואר" => "poBox",
        "טלפון קווי" => "landlinePhone",
        "טלפון נייד" => "mobilePhone",
        "סוג העבודה" => "jobType",
        "תאריך הפגיעה" => "dateOfInjury",
        "שעת הפגיעה" => "timeOfInjury",
        "מקום התאונה" => "accidentLocation",
        "כתובת מקום התאונה" => "accidentAddress",
        "תיאור התאונה" => "accidentDescription",
        "האיבר שנפגע" => "injuredBodyPart",
        "חתימה" => "signature",
        "תאריך מילוי הטופס" => "formFillingDate",
        "תאריך קבלת הטופס בקופה" => "formReceiptDateAtClinic",
        "למילוי ע\"י המוסד הרפואי" => "medicalInstitutionFields",
        "חבר בקופת חולים" => "healthFundMember",
        "מהות התאונה" => "natureOfAccident",
        "אבחנות רפואיות" => "medicalDiagnoses",
        other => other,
    }
}

/// Recursively translate all object keys to English
pub fn translate_to_english(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (translate_key(k).to_string(), translate_to_english(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(translate_to_english).collect()),
        other => other.clone(),
    }
}

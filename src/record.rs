// 📋 Record Model - Canonical flat records from the survey datasets
// One Record per source row: field name → scalar value, tagged with
// the originating dataset kind and file name.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// DATASET COLUMNS
// ============================================================================

/// Column names of the four survey datasets, kept in one place so a schema
/// change in the source files touches a single module.
pub mod columns {
    // intake + shared
    pub const SURVEY_NUMBER: &str = "Survey Number";
    pub const SURVEY_NAME: &str = "Survey Name";
    pub const WATER_TYPE: &str = "Water Type";
    pub const SUPPLY_MODE: &str = "Purchased or Self-Supplied";
    pub const SELLER_SURVEY_NUMBER: &str = "Seller Survey Number";
    pub const SELLER_NAME: &str = "Seller Name";
    pub const AQUIFER_NAME: &str = "Aquifer Name";
    pub const BASIN_NAME: &str = "Basin Name";
    pub const SOURCE_NAME: &str = "Source Name";
    pub const TOTAL_INTAKE: &str = "Total Intake";
    pub const YEAR: &str = "Year";

    // sales
    pub const BUYER_SURVEY_NUMBER: &str = "Buyer Survey Number";
    pub const BUYER_NAME: &str = "Buyer Name";
    pub const BUYER_VOLUME: &str = "Volume Reported By Buyer";

    // retail
    pub const WATER_SYSTEM_NAME: &str = "Water System Name";
}

// ============================================================================
// RECORD KIND
// ============================================================================

/// Which pipeline dataset a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// A water system drawing from a source (aquifer, surface water, system)
    Intake,

    /// A water transaction between a seller system and a buyer system
    Sale,
}

impl RecordKind {
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Intake => "intake",
            RecordKind::Sale => "sale",
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// Immutable flat record: field name → scalar (string, number, or null).
/// Missing columns, nulls, and blank strings all read back as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub kind: RecordKind,

    /// Field values keyed by trimmed column name
    pub fields: HashMap<String, Value>,

    /// Originating file name
    pub provenance: String,
}

impl Record {
    pub fn new(kind: RecordKind, provenance: &str) -> Self {
        Record {
            kind,
            fields: HashMap::new(),
            provenance: provenance.to_string(),
        }
    }

    /// Builder pattern: set a string field
    pub fn with_str(mut self, name: &str, value: &str) -> Self {
        self.fields
            .insert(name.to_string(), Value::String(value.to_string()));
        self
    }

    /// Builder pattern: set a numeric field
    pub fn with_num(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), json_number(value));
        self
    }

    /// String value of a field, trimmed; None for missing/null/blank
    pub fn str_field(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            }
            _ => None,
        }
    }

    /// Numeric value of a field; strings are parsed as a fallback
    pub fn num_field(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Integer value of a field (year, survey counts)
    pub fn int_field(&self, name: &str) -> Option<i64> {
        match self.fields.get(name) {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
            }
            _ => None,
        }
    }

    /// Case-insensitive comparison of a string field against an expected value
    pub fn field_is(&self, name: &str, expected: &str) -> bool {
        self.str_field(name)
            .map(|v| v.eq_ignore_ascii_case(expected))
            .unwrap_or(false)
    }
}

/// Build a JSON number value; non-finite floats degrade to null, never NaN
pub fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

// ============================================================================
// IDENTIFIER NORMALIZATION
// ============================================================================

/// Title-case a string: a letter following any non-letter is uppercased,
/// every other letter lowercased. Hyphenated words keep interior capitals
/// ("UNKNOWN-SOURCE" → "Unknown-Source").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }

    out
}

/// Normalize a resolved name identifier: trim + title-case
pub fn normalize_name(text: &str) -> String {
    title_case(text.trim())
}

/// Normalize a survey number: trim only. Survey numbers are opaque strings
/// and are never title-cased or compared numerically.
pub fn normalize_survey_number(text: &str) -> String {
    text.trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_field_trims_and_skips_blank() {
        let record = Record::new(RecordKind::Intake, "intake.csv")
            .with_str("Water Type", "  Ground Water  ")
            .with_str("Basin Name", "   ");

        assert_eq!(record.str_field("Water Type"), Some("Ground Water"));
        assert_eq!(record.str_field("Basin Name"), None);
        assert_eq!(record.str_field("Missing Column"), None);
    }

    #[test]
    fn test_num_field_parses_strings() {
        let record = Record::new(RecordKind::Intake, "intake.csv")
            .with_num("Total Intake", 1250.5)
            .with_str("Year", "2023");

        assert_eq!(record.num_field("Total Intake"), Some(1250.5));
        assert_eq!(record.int_field("Year"), Some(2023));
        assert_eq!(record.num_field("Missing"), None);
    }

    #[test]
    fn test_field_is_case_insensitive() {
        let record = Record::new(RecordKind::Intake, "intake.csv")
            .with_str("Water Type", "GROUND WATER");

        assert!(record.field_is("Water Type", "Ground Water"));
        assert!(!record.field_is("Water Type", "Surface Water"));
        assert!(!record.field_is("Missing", "anything"));
    }

    #[test]
    fn test_title_case_capitalizes_after_non_letters() {
        assert_eq!(title_case("PANHANDLE BASIN"), "Panhandle Basin");
        assert_eq!(title_case("unknown-source"), "Unknown-Source");
        assert_eq!(title_case("o'brien aquifer"), "O'Brien Aquifer");
        assert_eq!(title_case("1234"), "1234");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(
            normalize_name("  OGALLALA AQUIFER  "),
            "Ogallala Aquifer"
        );
    }

    #[test]
    fn test_normalize_survey_number_never_title_cases() {
        assert_eq!(normalize_survey_number(" 10450 "), "10450");
        assert_eq!(normalize_survey_number("ABC-1"), "ABC-1");
    }

    #[test]
    fn test_json_number_nan_degrades_to_null() {
        assert_eq!(json_number(f64::NAN), Value::Null);
        assert_eq!(json_number(2.0), Value::from(2.0));
    }
}

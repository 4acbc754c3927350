use serde_json::Value;

use super::types::{label_for, AnalysisRecord, Highlight};

/// Fallback description for fields outside the recognized vocabulary.
const UNKNOWN_PARAMETER_LABEL: &str = "unknown parameter";

/// Parse the first newline-delimited line of a chunk as JSON.
///
/// The server sends one meaningful line per chunk; later lines in the same
/// chunk are ignored by design, and across chunks each parse fully replaces
/// the previous result rather than merging. Bytes are decoded as UTF-8 with
/// replacement, so undecodable input surfaces as a JSON parse error.
pub fn first_json_object(chunk: &[u8]) -> Result<Value, serde_json::Error> {
    let text = String::from_utf8_lossy(chunk);
    let first_line = text.split('\n').next().unwrap_or_default();
    serde_json::from_str(first_line)
}

/// Convert a record into display-ready highlights, one per field, in the
/// record's insertion order.
///
/// Numeric values are rounded to the nearest integer (half away from zero)
/// before stringification; strings pass through unchanged; any other JSON
/// value keeps its JSON text. Descriptions come from the recognized-field
/// vocabulary, with a literal fallback for unknown names. No field is dropped
/// here; bookkeeping removal happens upstream in the stream driver.
pub fn to_highlights(record: &AnalysisRecord) -> Vec<Highlight> {
    record
        .iter()
        .map(|(key, value)| Highlight {
            title: display_title(value),
            description: label_for(key).unwrap_or(UNKNOWN_PARAMETER_LABEL).to_string(),
        })
        .collect()
}

fn display_title(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => (f.round() as i64).to_string(),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> AnalysisRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_first_json_object_plain() {
        let value = first_json_object(br#"{"total_spend_galactic": 100}"#).unwrap();
        assert_eq!(value, json!({"total_spend_galactic": 100}));
    }

    #[test]
    fn test_first_json_object_ignores_trailing_lines() {
        let chunk = b"{\"total_spend_galactic\": 100}\n{\"average_spend_galactic\": 50}\n";
        let value = first_json_object(chunk).unwrap();
        assert_eq!(value, json!({"total_spend_galactic": 100}));
    }

    #[test]
    fn test_first_json_object_tolerates_trailing_newlines() {
        let value = first_json_object(b"{\"total_spend_galactic\": 200}\n\n\n").unwrap();
        assert_eq!(value, json!({"total_spend_galactic": 200}));
    }

    #[test]
    fn test_first_json_object_rejects_garbage() {
        assert!(first_json_object(b"not json at all").is_err());
        assert!(first_json_object(b"{ \"corrupted\": json }").is_err());
        assert!(first_json_object(b"").is_err());
    }

    #[test]
    fn test_first_json_object_rejects_undecodable_bytes() {
        assert!(first_json_object(&[0xff, 0xfe, 0xfd]).is_err());
    }

    #[test]
    fn test_one_highlight_per_field() {
        let rec = record(json!({
            "total_spend_galactic": 100,
            "big_spent_civ": "monsters",
            "less_spent_civ": "humans",
        }));
        assert_eq!(to_highlights(&rec).len(), rec.len());
    }

    #[test]
    fn test_numbers_round_to_nearest_integer() {
        let rec = record(json!({
            "total_spend_galactic": 99.9,
            "average_spend_galactic": 150.6,
            "less_spent_value": 100.5,
        }));
        let titles: Vec<_> = to_highlights(&rec).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["100", "151", "101"]);
    }

    #[test]
    fn test_half_rounds_away_from_zero() {
        let rec = record(json!({"less_spent_value": -2.5, "big_spent_value": 2.5}));
        let titles: Vec<_> = to_highlights(&rec).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["-3", "3"]);
    }

    #[test]
    fn test_integer_values_unchanged() {
        let rec = record(json!({"total_spend_galactic": 100}));
        assert_eq!(to_highlights(&rec)[0].title, "100");
    }

    #[test]
    fn test_string_values_pass_through() {
        let rec = record(json!({"big_spent_at": "monday"}));
        let highlights = to_highlights(&rec);
        assert_eq!(highlights[0].title, "monday");
        assert_eq!(highlights[0].description, "Day of maximum spend");
    }

    #[test]
    fn test_unknown_field_gets_fallback_label() {
        let rec = record(json!({"mystery_metric": 7}));
        let highlights = to_highlights(&rec);
        assert_eq!(highlights[0].description, "unknown parameter");
        assert_eq!(highlights[0].title, "7");
    }

    #[test]
    fn test_order_follows_record_insertion_order() {
        let rec = record(json!({
            "big_spent_civ": "monsters",
            "total_spend_galactic": 1,
            "less_spent_civ": "humans",
        }));
        let descriptions: Vec<_> = to_highlights(&rec)
            .into_iter()
            .map(|h| h.description)
            .collect();
        assert_eq!(
            descriptions,
            vec![
                "Civilization with maximum spend",
                "Total galactic spend",
                "Civilization with minimum spend",
            ]
        );
    }

    #[test]
    fn test_empty_record_yields_no_highlights() {
        assert!(to_highlights(&AnalysisRecord::new()).is_empty());
    }
}

//! Record shapes flowing into and out of the cleaning pipeline

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single input message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Build a record from a JSON object with `id` and `text` fields
    ///
    /// Numeric ids are accepted and stringified. Returns `None` when either
    /// field is missing or `text` is not a string.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = match value.get("id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let text = value.get("text")?.as_str()?.to_string();

        Some(Self { id, text })
    }
}

/// A cleaned message, annotated by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub id: String,
    pub text: String,
    /// Character count of the normalized text
    pub text_length: usize,
    /// Classified language, or `None` when language filtering was disabled
    pub detected_lang: Option<String>,
}

impl EnrichedRecord {
    /// JSON object view used by the validator and the JSONL writer
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "text": self.text,
            "text_length": self.text_length,
            "detected_lang": self.detected_lang,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_value() {
        let record = Record::from_value(&json!({"id": "a1", "text": "halo"})).unwrap();
        assert_eq!(record, Record::new("a1", "halo"));

        let record = Record::from_value(&json!({"id": 42, "text": "halo", "extra": true})).unwrap();
        assert_eq!(record.id, "42");
    }

    #[test]
    fn test_record_from_value_rejects_incomplete() {
        assert!(Record::from_value(&json!({"text": "halo"})).is_none());
        assert!(Record::from_value(&json!({"id": 1})).is_none());
        assert!(Record::from_value(&json!({"id": 1, "text": null})).is_none());
        assert!(Record::from_value(&json!("just a string")).is_none());
    }

    #[test]
    fn test_enriched_record_fields() {
        let record = EnrichedRecord {
            id: "7".to_string(),
            text: "saldo belum masuk".to_string(),
            text_length: 17,
            detected_lang: Some("id".to_string()),
        };

        let value = record.to_value();
        assert_eq!(value["id"], "7");
        assert_eq!(value["text_length"], 17);
        assert_eq!(value["detected_lang"], "id");

        let line = serde_json::to_string(&record).unwrap();
        assert_eq!(
            line,
            r#"{"id":"7","text":"saldo belum masuk","text_length":17,"detected_lang":"id"}"#
        );
    }

    #[test]
    fn test_enriched_record_without_language() {
        let record = EnrichedRecord {
            id: "7".to_string(),
            text: "ok".to_string(),
            text_length: 2,
            detected_lang: None,
        };

        assert!(record.to_value()["detected_lang"].is_null());
    }
}

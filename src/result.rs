//! The scoring service's response.
//!
//! The payload is treated as partially trusted: the body must be a JSON
//! object, the recognized fields are picked out when they carry the expected
//! type, and the whole object is kept as-is for the debug view.

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::AnalyzeError;

/// Per-section feedback block returned by the v2 endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionFeedback {
    pub section: String,
    pub score: Option<Number>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub ats_score: Option<Number>,
    pub role_match_score: Option<Number>,
    pub detected_skills: Vec<String>,

    // Extra fields the v2 endpoint sends; absent on older deployments
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub critical_improvements: Vec<String>,
    pub section_feedback: Vec<SectionFeedback>,
    pub final_verdict: Option<String>,

    raw: Map<String, Value>,
}

impl ScoreResult {
    pub fn from_json(body: &str) -> Result<Self, AnalyzeError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AnalyzeError::Parse(format!("invalid JSON ({})", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, AnalyzeError> {
        let raw = match value {
            Value::Object(map) => map,
            other => {
                return Err(AnalyzeError::Parse(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self {
            ats_score: number_field(&raw, "ats_score"),
            role_match_score: number_field(&raw, "role_match_score"),
            detected_skills: string_list(&raw, "detected_skills"),
            missing_skills: string_list(&raw, "missing_skills"),
            strengths: string_list(&raw, "strengths"),
            critical_improvements: string_list(&raw, "critical_improvements"),
            section_feedback: section_feedback(&raw),
            final_verdict: raw
                .get("final_verdict")
                .and_then(Value::as_str)
                .map(str::to_string),
            raw,
        })
    }

    /// The full response object, in the order the server sent it.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_default()
    }

    pub fn has_insights(&self) -> bool {
        self.final_verdict.is_some()
            || !self.strengths.is_empty()
            || !self.missing_skills.is_empty()
            || !self.critical_improvements.is_empty()
            || !self.section_feedback.is_empty()
    }
}

impl Serialize for ScoreResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

fn number_field(raw: &Map<String, Value>, key: &str) -> Option<Number> {
    match raw.get(key) {
        Some(Value::Number(n)) => Some(n.clone()),
        Some(Value::Null) | None => None,
        Some(other) => {
            debug!("Ignoring non-numeric {}: {}", key, other);
            None
        }
    }
}

fn string_list(raw: &Map<String, Value>, key: &str) -> Vec<String> {
    match raw.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            debug!("Ignoring non-list {}: {}", key, other);
            Vec::new()
        }
    }
}

fn section_feedback(raw: &Map<String, Value>) -> Vec<SectionFeedback> {
    let Some(Value::Array(items)) = raw.get("section_feedback") else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let section = entry.get("section")?.as_str()?.to_string();
            Some(SectionFeedback {
                section,
                score: number_field(entry, "score"),
                comments: string_list(entry, "comments"),
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_recognized_fields() {
        let result = ScoreResult::from_json(
            r#"{"ats_score": 87, "role_match_score": 64, "detected_skills": ["SQL", "Excel"]}"#,
        )
        .unwrap();

        assert_eq!(result.ats_score.as_ref().and_then(Number::as_i64), Some(87));
        assert_eq!(result.role_match_score.as_ref().and_then(Number::as_i64), Some(64));
        assert_eq!(result.detected_skills, vec!["SQL", "Excel"]);
        assert!(!result.has_insights());
    }

    #[test]
    fn test_wrong_types_are_treated_as_absent() {
        let result = ScoreResult::from_json(
            r#"{"ats_score": "high", "role_match_score": null, "detected_skills": "SQL"}"#,
        )
        .unwrap();

        assert!(result.ats_score.is_none());
        assert!(result.role_match_score.is_none());
        assert!(result.detected_skills.is_empty());
        // Still visible in the debug view
        assert_eq!(result.raw().get("ats_score"), Some(&Value::from("high")));
    }

    #[test]
    fn test_non_string_skills_are_skipped() {
        let result =
            ScoreResult::from_json(r#"{"detected_skills": ["Python", 3, null, "Tableau"]}"#).unwrap();
        assert_eq!(result.detected_skills, vec!["Python", "Tableau"]);
    }

    #[test]
    fn test_rejects_non_object_bodies() {
        assert!(matches!(
            ScoreResult::from_json("[1, 2, 3]"),
            Err(AnalyzeError::Parse(msg)) if msg.contains("array")
        ));
        assert!(matches!(
            ScoreResult::from_json("<html>oops</html>"),
            Err(AnalyzeError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_fields_keep_their_order() {
        let body = r#"{"zeta": 1, "ats_score": 70, "alpha": {"nested": true}, "detected_skills": []}"#;
        let result = ScoreResult::from_json(body).unwrap();

        let keys: Vec<&str> = result.raw().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "ats_score", "alpha", "detected_skills"]);

        let pretty = result.to_pretty_json();
        assert!(pretty.find("zeta").unwrap() < pretty.find("alpha").unwrap());
        assert!(pretty.contains("\"nested\": true"));

        let reparsed: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(reparsed, serde_json::from_str::<Value>(body).unwrap());
    }

    #[test]
    fn test_v2_insight_fields() {
        let body = r#"{
            "ats_score": 72,
            "role_match_score": null,
            "detected_skills": ["SQL"],
            "missing_skills": ["Power BI"],
            "strengths": ["Clear summary"],
            "critical_improvements": ["Quantify impact"],
            "section_feedback": [
                {"section": "Experience", "score": 6, "comments": ["Add metrics"]},
                {"score": 3}
            ],
            "final_verdict": "Promising but needs numbers"
        }"#;
        let result = ScoreResult::from_json(body).unwrap();

        assert!(result.has_insights());
        assert_eq!(result.missing_skills, vec!["Power BI"]);
        assert_eq!(result.section_feedback.len(), 1);
        assert_eq!(result.section_feedback[0].section, "Experience");
        assert_eq!(result.section_feedback[0].comments, vec!["Add metrics"]);
        assert_eq!(result.final_verdict.as_deref(), Some("Promising but needs numbers"));
    }

    #[test]
    fn test_serializes_as_raw_object() {
        let body = r#"{"ats_score": 87, "extra": "kept"}"#;
        let result = ScoreResult::from_json(body).unwrap();
        let out = serde_json::to_value(&result).unwrap();
        assert_eq!(out, serde_json::from_str::<Value>(body).unwrap());
    }

    #[test]
    fn test_number_literals_are_kept_verbatim() {
        let body = r#"{"ats_score": 87.50, "weight": 1.50, "trace_id": 123456789012345678901234567890}"#;
        let result = ScoreResult::from_json(body).unwrap();

        let pretty = result.to_pretty_json();
        assert!(pretty.contains("\"weight\": 1.50"), "{}", pretty);
        assert!(pretty.contains("123456789012345678901234567890"), "{}", pretty);
        assert_eq!(result.ats_score.as_ref().and_then(Number::as_f64), Some(87.5));
    }
}

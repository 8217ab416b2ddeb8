//! Presentation model for a `ScoreResult`.
//!
//! Pure functions shared by the ratatui renderer and the plain-text output
//! of the headless command.

use serde_json::Number;

use crate::result::ScoreResult;

pub const SCORE_PLACEHOLDER: &str = "--/100";
pub const NO_SKILLS_PLACEHOLDER: &str = "No skills detected.";

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard<'a> {
    pub title: &'static str,
    value: Option<&'a Number>,
}

impl<'a> ScoreCard<'a> {
    pub fn new(title: &'static str, value: Option<&'a Number>) -> Self {
        Self { title, value }
    }

    pub fn ats(result: &'a ScoreResult) -> Self {
        Self::new("ATS Score", result.ats_score.as_ref())
    }

    pub fn role_match(result: &'a ScoreResult) -> Self {
        Self::new("Role Match Score", result.role_match_score.as_ref())
    }

    /// "87/100", the number unclamped, or the placeholder.
    pub fn label(&self) -> String {
        match self.value {
            Some(n) => format!("{}/100", n),
            None => SCORE_PLACEHOLDER.to_string(),
        }
    }

    /// Bar fill in percent, clamped to 0..=100.
    pub fn percent(&self) -> u16 {
        self.value
            .and_then(Number::as_f64)
            .map(|v| v.clamp(0.0, 100.0).round() as u16)
            .unwrap_or(0)
    }
}

pub fn score_cards(result: &ScoreResult) -> [ScoreCard<'_>; 2] {
    [ScoreCard::ats(result), ScoreCard::role_match(result)]
}

/// Plain-text rendering for terminals without the TUI.
pub fn report_lines(result: &ScoreResult, api_base_url: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for card in score_cards(result) {
        let filled = (card.percent() / 5) as usize;
        lines.push(format!(
            "{:<17} {:>8}  [{}{}] {}%",
            format!("{}:", card.title),
            card.label(),
            "#".repeat(filled),
            "-".repeat(20 - filled),
            card.percent()
        ));
    }

    lines.push(String::new());
    lines.push("Detected Skills".to_string());
    if result.detected_skills.is_empty() {
        lines.push(format!("  {}", NO_SKILLS_PLACEHOLDER));
    } else {
        lines.push(format!("  {}", result.detected_skills.join(", ")));
    }

    if let Some(verdict) = &result.final_verdict {
        lines.push(String::new());
        lines.push(format!("Verdict: {}", verdict));
    }
    push_list(&mut lines, "Strengths", &result.strengths);
    push_list(&mut lines, "Missing Skills", &result.missing_skills);
    push_list(&mut lines, "Critical Improvements", &result.critical_improvements);

    if !result.section_feedback.is_empty() {
        lines.push(String::new());
        lines.push("Section Feedback".to_string());
        for feedback in &result.section_feedback {
            let score = feedback
                .score
                .as_ref()
                .map(Number::to_string)
                .unwrap_or_else(|| "--".to_string());
            lines.push(format!("  {} ({})", feedback.section, score));
            for comment in &feedback.comments {
                lines.push(format!("    - {}", comment));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!("API used: {}", api_base_url));
    lines
}

fn push_list(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(title.to_string());
    lines.extend(items.iter().map(|item| format!("  - {}", item)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(body: &str) -> ScoreResult {
        ScoreResult::from_json(body).unwrap()
    }

    #[test]
    fn test_in_range_scores() {
        let r = result(r#"{"ats_score": 87, "role_match_score": 64, "detected_skills": ["SQL", "Excel"]}"#);
        let [ats, role] = score_cards(&r);

        assert_eq!(ats.label(), "87/100");
        assert_eq!(ats.percent(), 87);
        assert_eq!(role.label(), "64/100");
        assert_eq!(role.percent(), 64);
    }

    #[test]
    fn test_out_of_range_scores_clamp_bar_only() {
        let r = result(r#"{"ats_score": 130, "role_match_score": -5}"#);
        let [ats, role] = score_cards(&r);

        assert_eq!(ats.label(), "130/100");
        assert_eq!(ats.percent(), 100);
        assert_eq!(role.label(), "-5/100");
        assert_eq!(role.percent(), 0);
    }

    #[test]
    fn test_missing_scores_use_placeholder() {
        let r = result(r#"{"ats_score": "n/a"}"#);
        let [ats, role] = score_cards(&r);

        assert_eq!(ats.label(), SCORE_PLACEHOLDER);
        assert_eq!(ats.percent(), 0);
        assert_eq!(role.label(), SCORE_PLACEHOLDER);
    }

    #[test]
    fn test_fractional_score() {
        let r = result(r#"{"ats_score": 72.6}"#);
        let card = ScoreCard::ats(&r);
        assert_eq!(card.label(), "72.6/100");
        assert_eq!(card.percent(), 73);
    }

    #[test]
    fn test_report_lines() {
        let r = result(r#"{"ats_score": 87, "role_match_score": 64, "detected_skills": ["SQL", "Excel"]}"#);
        let lines = report_lines(&r, "http://localhost:8000");

        assert!(lines[0].contains("87/100") && lines[0].ends_with("87%"));
        assert!(lines[1].contains("64/100"));
        assert!(lines.contains(&"  SQL, Excel".to_string()));
        assert_eq!(lines.last().unwrap(), "API used: http://localhost:8000");
        assert!(!lines.iter().any(|l| l.starts_with("Verdict")));
    }

    #[test]
    fn test_report_lines_empty_skills_and_insights() {
        let r = result(
            r#"{"detected_skills": [], "final_verdict": "Solid", "strengths": ["Concise"],
                "section_feedback": [{"section": "Skills", "score": 8, "comments": ["Group by domain"]}]}"#,
        );
        let lines = report_lines(&r, "http://x");

        assert!(lines.contains(&format!("  {}", NO_SKILLS_PLACEHOLDER)));
        assert!(lines.contains(&"Verdict: Solid".to_string()));
        assert!(lines.contains(&"  - Concise".to_string()));
        assert!(lines.contains(&"  Skills (8)".to_string()));
        assert!(lines.contains(&"    - Group by domain".to_string()));
    }
}

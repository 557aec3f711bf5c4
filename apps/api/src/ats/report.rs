//! Typed ATS match report.
//!
//! The scoring call returns JSON text. This module is the hardening layer on
//! top: it gives the text a concrete shape and rejects anything that does not
//! fit the schema the scoring prompt asks for.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLevel {
    Poor,
    Fair,
    Good,
    Strong,
    Excellent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Low,
    Partial,
    Strong,
}

/// Matched vs. missing items for one dimension (skills, keywords, tools).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    #[serde(default)]
    pub matched: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceMatch {
    pub job_requirement: String,
    pub resume_experience: String,
    pub match_status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTitleMatch {
    pub job_title_in_jd: String,
    #[serde(default)]
    pub resume_titles: Vec<String>,
    pub match_status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Searchability {
    pub score: u8,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Full Jobscan-style report. `match_rate` and `match_level` are mandatory;
/// the sections may be omitted by the model and are then `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    pub match_rate: u8,
    pub match_level: MatchLevel,
    #[serde(default)]
    pub hard_skills: Option<SkillMatch>,
    #[serde(default)]
    pub soft_skills: Option<SkillMatch>,
    #[serde(default)]
    pub keywords: Option<SkillMatch>,
    #[serde(default)]
    pub tools_and_technologies: Option<SkillMatch>,
    #[serde(default)]
    pub experience: Option<ExperienceMatch>,
    #[serde(default)]
    pub job_title_match: Option<JobTitleMatch>,
    #[serde(default)]
    pub searchability: Option<Searchability>,
    #[serde(default)]
    pub recruiter_tips: Vec<String>,
}

impl AtsReport {
    /// Parses and validates the raw text returned by the scoring call.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let report: AtsReport = serde_json::from_str(strip_code_fence(raw))
            .map_err(|e| AppError::MalformedResponse(format!("ATS report is not valid: {e}")))?;
        report.validate()?;
        Ok(report)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.match_rate > 100 {
            return Err(AppError::MalformedResponse(format!(
                "match_rate {} is outside 0-100",
                self.match_rate
            )));
        }
        if let Some(searchability) = &self.searchability {
            if searchability.score > 100 {
                return Err(AppError::MalformedResponse(format!(
                    "searchability.score {} is outside 0-100",
                    searchability.score
                )));
            }
        }
        Ok(())
    }
}

/// Removes one surrounding Markdown code fence (with or without a `json` tag).
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const EXAMPLE_REPORT: &str = r#"{
  "match_rate": 62,
  "match_level": "Good",
  "hard_skills": {"matched": ["Python"], "missing": ["Go"]},
  "soft_skills": {"matched": ["Communication"], "missing": []},
  "keywords": {"matched": ["software engineer"], "missing": ["distributed systems"]},
  "tools_and_technologies": {"matched": [], "missing": ["Kubernetes"]},
  "experience": {"job_requirement": "3+ years", "resume_experience": "5 years", "match_status": "Strong"},
  "job_title_match": {"job_title_in_jd": "Go Developer", "resume_titles": ["Software Engineer"], "match_status": "Partial"},
  "searchability": {"score": 80, "issues": ["missing summary section"]},
  "recruiter_tips": ["Add Go projects", "Mention distributed systems work"]
}"#;

    #[test]
    fn test_parses_example_report() {
        let report = AtsReport::parse(EXAMPLE_REPORT).unwrap();
        assert_eq!(report.match_rate, 62);
        assert_eq!(report.match_level, MatchLevel::Good);
        assert_eq!(report.hard_skills.unwrap().missing, vec!["Go"]);
        assert_eq!(report.experience.unwrap().match_status, MatchStatus::Strong);
        assert_eq!(
            report.job_title_match.unwrap().match_status,
            MatchStatus::Partial
        );
        assert_eq!(report.searchability.unwrap().score, 80);
        assert_eq!(report.recruiter_tips.len(), 2);
    }

    #[test]
    fn test_serializes_with_schema_field_names() {
        let report = AtsReport::parse(EXAMPLE_REPORT).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["match_level"], "Good");
        assert_eq!(value["tools_and_technologies"]["missing"][0], "Kubernetes");
        assert_eq!(value["job_title_match"]["job_title_in_jd"], "Go Developer");
    }

    #[test]
    fn test_accepts_fenced_json() {
        let fenced = format!("```json\n{EXAMPLE_REPORT}\n```");
        assert!(AtsReport::parse(&fenced).is_ok());
    }

    #[test]
    fn test_missing_sections_are_none() {
        let report = AtsReport::parse(r#"{"match_rate": 10, "match_level": "Poor"}"#).unwrap();
        assert!(report.hard_skills.is_none());
        assert!(report.searchability.is_none());
        assert!(report.recruiter_tips.is_empty());
    }

    #[test]
    fn test_rejects_match_rate_above_100() {
        let result = AtsReport::parse(r#"{"match_rate": 140, "match_level": "Excellent"}"#);
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn test_rejects_negative_match_rate() {
        let result = AtsReport::parse(r#"{"match_rate": -5, "match_level": "Poor"}"#);
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn test_rejects_searchability_above_100() {
        let result = AtsReport::parse(
            r#"{"match_rate": 50, "match_level": "Fair", "searchability": {"score": 101, "issues": []}}"#,
        );
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn test_rejects_unknown_match_level() {
        let result = AtsReport::parse(r#"{"match_rate": 50, "match_level": "Okay"}"#);
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn test_rejects_prose() {
        let result = AtsReport::parse("Here is your report: the resume is a good match.");
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }
}

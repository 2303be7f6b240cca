//! Presentation record for a parsed job application
//!
//! The extraction core yields `Option` fields; this is where the display
//! placeholders, the application date and the status are attached.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ExtractionResult;

/// Placeholder shown when no company was resolved
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Placeholder shown when no position was resolved
pub const POSITION_NOT_FOUND: &str = "Position Not Found";

/// Window within which two identical applications count as one
const DUPLICATE_WINDOW_HOURS: i64 = 24;

/// Lifecycle state of an application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interviewing,
    Rejected,
    Accepted,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Interviewing => write!(f, "interviewing"),
            Self::Rejected => write!(f, "rejected"),
            Self::Accepted => write!(f, "accepted"),
        }
    }
}

/// A job application as presented to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub company: String,
    pub position: String,
    pub date_applied: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub confidence_score: f32,
}

impl JobApplication {
    /// Apply placeholders to an extraction result and stamp it
    pub fn from_extraction(result: &ExtractionResult, date_applied: DateTime<Utc>) -> Self {
        Self {
            company: result
                .company
                .clone()
                .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
            position: result
                .position
                .clone()
                .unwrap_or_else(|| POSITION_NOT_FOUND.to_string()),
            date_applied,
            status: ApplicationStatus::Applied,
            confidence_score: result.confidence_score,
        }
    }

    /// Same company and position (ignoring case, punctuation and spacing),
    /// applied within 24 hours of each other
    pub fn is_duplicate(&self, other: &JobApplication) -> bool {
        let same_company = normalize(&self.company) == normalize(&other.company);
        let same_position = normalize(&self.position) == normalize(&other.position);
        if !(same_company && same_position) {
            return false;
        }

        let gap = (self.date_applied - other.date_applied).abs();
        gap < Duration::hours(DUPLICATE_WINDOW_HOURS)
    }
}

/// Lowercase, keep word characters and hyphens, collapse whitespace
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn application(company: &str, position: &str, hour: u32) -> JobApplication {
        JobApplication {
            company: company.to_string(),
            position: position.to_string(),
            date_applied: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
            status: ApplicationStatus::Applied,
            confidence_score: 0.8,
        }
    }

    #[test]
    fn test_placeholders_for_missing_fields() {
        let result = ExtractionResult {
            company: None,
            position: None,
            confidence_score: 0.0,
        };
        let app = JobApplication::from_extraction(&result, Utc::now());

        assert_eq!(app.company, UNKNOWN_COMPANY);
        assert_eq!(app.position, POSITION_NOT_FOUND);
        assert_eq!(app.status, ApplicationStatus::Applied);
    }

    #[test]
    fn test_serialized_field_names() {
        let app = application("Stripe", "Software Engineer", 9);
        let json = serde_json::to_value(&app).unwrap();

        assert_eq!(json["company"], "Stripe");
        assert_eq!(json["status"], "applied");
        assert!(json["dateApplied"].is_string());
        assert!(json["confidenceScore"].is_number());
    }

    #[test]
    fn test_duplicate_within_window() {
        let a = application("Stripe, Inc.", "Software  Engineer", 1);
        let b = application("stripe inc", "software engineer", 20);
        assert!(a.is_duplicate(&b));
        assert!(b.is_duplicate(&a));
    }

    #[test]
    fn test_not_duplicate_for_different_position() {
        let a = application("Stripe", "Software Engineer", 1);
        let b = application("Stripe", "Backend Engineer", 2);
        assert!(!a.is_duplicate(&b));
    }

    #[test]
    fn test_not_duplicate_outside_window() {
        let a = application("Stripe", "Software Engineer", 0);
        let mut b = application("Stripe", "Software Engineer", 0);
        b.date_applied += Duration::hours(25);
        assert!(!a.is_duplicate(&b));
    }
}

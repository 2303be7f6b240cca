//! Job-application email classifier
//!
//! Cheap sender/subject screen deciding whether an email is worth parsing.

use serde::{Deserialize, Serialize};

/// Applicant-tracking systems recognised by sender address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtsProvider {
    LinkedIn,
    Greenhouse,
    Workday,
    Lever,
    Ashby,
    SmartRecruiters,
}

impl AtsProvider {
    pub const ALL: [AtsProvider; 6] = [
        AtsProvider::LinkedIn,
        AtsProvider::Greenhouse,
        AtsProvider::Workday,
        AtsProvider::Lever,
        AtsProvider::Ashby,
        AtsProvider::SmartRecruiters,
    ];

    /// Mail domain the provider sends from
    pub fn domain(&self) -> &'static str {
        match self {
            Self::LinkedIn => "linkedin.com",
            Self::Greenhouse => "greenhouse-mail.io",
            Self::Workday => "myworkday.com",
            Self::Lever => "lever.co",
            Self::Ashby => "ashbyhq.com",
            Self::SmartRecruiters => "smartrecruiters.com",
        }
    }

    /// Provider whose domain appears in a sender address
    pub fn detect(sender: &str) -> Option<Self> {
        let sender = sender.to_lowercase();
        Self::ALL.into_iter().find(|p| sender.contains(p.domain()))
    }
}

/// Outcome of classifying one email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub is_job_application: bool,
    pub provider: Option<AtsProvider>,
    pub reason: String,
}

/// Keyword screen for job-application emails
#[derive(Debug, Clone)]
pub struct JobEmailClassifier {
    job_keywords: Vec<String>,
    exclude_keywords: Vec<String>,
}

impl Default for JobEmailClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl JobEmailClassifier {
    pub fn new() -> Self {
        Self {
            job_keywords: [
                "applied",
                "application",
                "thank you for applying",
                "position",
                "role",
                "engineer",
                "developer",
                "software",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            exclude_keywords: [
                "newsletter",
                "subscription",
                "receipt",
                "order",
                "purchase",
                "payment",
                "invoice",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Classify by sender and subject. A known ATS sender always counts;
    /// exclusion keywords in the subject beat job keywords.
    pub fn classify(&self, from: &str, subject: &str) -> Classification {
        if let Some(provider) = AtsProvider::detect(from) {
            return Classification {
                is_job_application: true,
                provider: Some(provider),
                reason: format!("sender is {}", provider.domain()),
            };
        }

        let subject = subject.to_lowercase();
        let from = from.to_lowercase();

        if let Some(word) = self.exclude_keywords.iter().find(|w| subject.contains(w.as_str())) {
            return Classification {
                is_job_application: false,
                provider: None,
                reason: format!("subject mentions '{word}'"),
            };
        }

        match self
            .job_keywords
            .iter()
            .find(|w| subject.contains(w.as_str()) || from.contains(w.as_str()))
        {
            Some(word) => Classification {
                is_job_application: true,
                provider: None,
                reason: format!("mentions '{word}'"),
            },
            None => Classification {
                is_job_application: false,
                provider: None,
                reason: "no job keywords".to_string(),
            },
        }
    }

    pub fn is_job_application(&self, from: &str, subject: &str) -> bool {
        self.classify(from, subject).is_job_application
    }
}

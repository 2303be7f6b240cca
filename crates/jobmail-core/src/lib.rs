//! jobmail Core - Domain models, lookup tables, and shared types
//!
//! This crate defines the core abstractions used throughout jobmail:
//! - Email input and extraction result models
//! - Named-entity spans produced by NER taggers
//! - Lookup tables (aliases, title catalog, seniority words)
//! - Common error types
//! - Configuration management

pub mod application;
pub mod config;
pub mod lexicon;

pub use application::{ApplicationStatus, JobApplication, POSITION_NOT_FOUND, UNKNOWN_COMPANY};
pub use config::{AppConfig, ConfigError, ExtractionConfig, LoggingConfig, NerConfig, NerProvider};
pub use lexicon::{AliasEntry, AliasTable, Lexicon, TitleCatalog, TitleCategory};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for jobmail operations
#[derive(Error, Debug)]
pub enum JobmailError {
    #[error("NER error: {0}")]
    Ner(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for JobmailError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JobmailError>;

// ============================================================================
// Email Input
// ============================================================================

/// Raw fields of one email, as received from the transport
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailInput {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub sender_address: String,
}

impl EmailInput {
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        sender_address: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            sender_address: sender_address.into(),
        }
    }

    /// Subject and body joined by a newline; the text every rule scans
    pub fn combined_text(&self) -> String {
        combined_text(&self.subject, &self.body)
    }
}

/// Subject and body joined by a newline
pub fn combined_text(subject: &str, body: &str) -> String {
    format!("{subject}\n{body}")
}

// ============================================================================
// Entity Spans
// ============================================================================

/// Entity label emitted by a NER tagger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityLabel {
    Org,
    Person,
    Location,
    Date,
    Other,
}

impl EntityLabel {
    /// Map a tagger's label vocabulary (spaCy, CoNLL, ...) onto ours
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "ORG" | "ORGANIZATION" | "ORGANISATION" => Self::Org,
            "PERSON" | "PER" => Self::Person,
            "GPE" | "LOC" | "LOCATION" => Self::Location,
            "DATE" => Self::Date,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Org => "ORG",
            Self::Person => "PERSON",
            Self::Location => "LOCATION",
            Self::Date => "DATE",
            Self::Other => "OTHER",
        }
    }
}

impl From<String> for EntityLabel {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<EntityLabel> for String {
    fn from(label: EntityLabel) -> Self {
        label.as_str().to_string()
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A labelled span of text; `start`/`end` are byte offsets into the tagged text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: EntityLabel, start: usize) -> Self {
        let text = text.into();
        let end = start + text.len();
        Self {
            text,
            label,
            start,
            end,
        }
    }

    pub fn is_org(&self) -> bool {
        self.label == EntityLabel::Org
    }
}

// ============================================================================
// Extraction Result
// ============================================================================

/// Best-effort structured record for one email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub company: Option<String>,
    pub position: Option<String>,
    pub confidence_score: f32,
}

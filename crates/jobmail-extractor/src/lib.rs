//! jobmail Extractor - Job-application extraction pipeline
//!
//! Turns the subject, body and sender of an email into a company name, a job
//! title and a confidence score. Company resolution consults a Named Entity
//! Recognition (NER) tagger; everything else is plain table-driven matching.

use async_trait::async_trait;
use jobmail_core::{EntitySpan, Result};

/// Trait for NER taggers
///
/// Implementations must be safe to call concurrently from many requests.
#[async_trait]
pub trait EntityTagger: Send + Sync {
    /// Tag entities in `text`, in source-text order
    async fn tag(&self, text: &str) -> Result<Vec<EntitySpan>>;

    /// Short identifier used in logs and readiness reports
    fn name(&self) -> &'static str;
}

pub mod classify;
pub mod company;
pub mod confidence;
pub mod metrics;
pub mod ner;
pub mod pipeline;
pub mod position;
pub mod text;

pub use classify::{AtsProvider, Classification, JobEmailClassifier};
pub use company::{CompanyMatch, CompanyResolver, CompanyRule};
pub use confidence::ConfidenceScorer;
pub use metrics::{AggregateMetrics, Evaluator, FieldMetrics, LabeledEmail};
pub use ner::{build_tagger, RemoteNer, RuleBasedNer};
pub use pipeline::EmailParser;
pub use position::PositionResolver;

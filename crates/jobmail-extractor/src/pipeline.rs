//! Extraction pipeline
//!
//! Wires the company resolver, the position resolver and the scorer together.
//! One call per email, no shared mutable state.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::company::CompanyResolver;
use crate::confidence::ConfidenceScorer;
use crate::position::PositionResolver;
use crate::EntityTagger;
use jobmail_core::{EmailInput, ExtractionResult, Lexicon, Result};

/// Parses job-application emails into structured records
pub struct EmailParser {
    company: CompanyResolver,
    position: PositionResolver,
    scorer: ConfidenceScorer,
    tagger_name: &'static str,
}

impl EmailParser {
    pub fn new(lexicon: Arc<Lexicon>, tagger: Arc<dyn EntityTagger>) -> Self {
        let tagger_name = tagger.name();
        Self {
            company: CompanyResolver::new(lexicon.clone(), tagger),
            position: PositionResolver::new(lexicon.clone()),
            scorer: ConfidenceScorer::new(lexicon),
            tagger_name,
        }
    }

    /// Name of the NER tagger in use
    pub fn tagger_name(&self) -> &'static str {
        self.tagger_name
    }

    /// Extract company, position and a confidence score.
    ///
    /// Fails only when the NER tagger fails; missing signals yield `None`.
    #[instrument(skip_all, fields(tagger = self.tagger_name))]
    pub async fn parse(&self, email: &EmailInput) -> Result<ExtractionResult> {
        let company = self
            .company
            .resolve(&email.subject, &email.body, &email.sender_address)
            .await?
            .map(|m| m.name);
        let position = self.position.resolve(&email.subject, &email.body);
        let confidence_score = self.scorer.score(company.as_deref(), position.as_deref());

        debug!(
            company = company.as_deref().unwrap_or("-"),
            position = position.as_deref().unwrap_or("-"),
            confidence_score,
            "Email parsed"
        );

        Ok(ExtractionResult {
            company,
            position,
            confidence_score,
        })
    }
}

//! Application state management
//!
//! Author: hephaex@gmail.com

use jobmail_core::{AppConfig, Lexicon};
use jobmail_extractor::{build_tagger, EmailParser, EntityTagger, JobEmailClassifier};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Extraction pipeline
    pub parser: EmailParser,
    /// Job-email screen
    pub classifier: JobEmailClassifier,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Parse calls that failed on the NER tagger
    pub ner_failures: AtomicU64,
    /// Ready status
    pub is_ready: AtomicBool,
}

impl AppState {
    /// Build state from config: load the lexicon and the configured tagger
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let lexicon = Lexicon::load(&config.extraction)?;
        let tagger = build_tagger(&config.ner)?;
        Ok(Self::with_parts(config, lexicon, tagger))
    }

    /// Build state around an explicit lexicon and tagger
    pub fn with_parts(config: AppConfig, lexicon: Lexicon, tagger: Arc<dyn EntityTagger>) -> Self {
        Self {
            config,
            parser: EmailParser::new(Arc::new(lexicon), tagger),
            classifier: JobEmailClassifier::new(),
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            ner_failures: AtomicU64::new(0),
            is_ready: AtomicBool::new(true),
        }
    }

    /// Default config and lexicon with the given tagger
    pub fn with_tagger(tagger: Arc<dyn EntityTagger>) -> Self {
        Self::with_parts(AppConfig::default(), Lexicon::default(), tagger)
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn record_ner_failure(&self) {
        self.ner_failures.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get_ner_failures(&self) -> u64 {
        self.ner_failures.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if service is ready
    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::SeqCst)
    }

    /// Set ready status
    pub fn set_ready(&self, ready: bool) {
        self.is_ready.store(ready, Ordering::SeqCst);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_tagger(Arc::new(jobmail_extractor::RuleBasedNer::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_counter() {
        let state = AppState::default();
        assert_eq!(state.increment_requests(), 0);
        assert_eq!(state.increment_requests(), 1);
        assert_eq!(state.get_request_count(), 2);
    }

    #[test]
    fn test_ready_flag() {
        let state = AppState::default();
        assert!(state.is_ready());
        state.set_ready(false);
        assert!(!state.is_ready());
    }

    #[test]
    fn test_new_uses_configured_tagger() {
        let state = AppState::new(AppConfig::default()).unwrap();
        assert_eq!(state.parser.tagger_name(), "rules");
    }
}

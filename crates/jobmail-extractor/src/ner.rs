//! Named Entity Recognition (NER) module
//!
//! Provides two taggers behind [`EntityTagger`]:
//! - Rule-based: corporate-suffix patterns + an employer gazetteer, in process
//! - Remote: an HTTP NER service (e.g. a spaCy model server)

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::text::find_word;
use crate::EntityTagger;
use jobmail_core::{EntityLabel, EntitySpan, JobmailError, NerConfig, NerProvider, Result};

// ============================================================================
// Rule-based NER
// ============================================================================

/// Gazetteer entry for organization matching
#[derive(Debug, Clone)]
pub struct DictionaryEntry {
    pub term: String,
    pub label: EntityLabel,
    pub aliases: Vec<String>,
}

/// A candidate span before overlap resolution
#[derive(Debug, Clone)]
struct Candidate {
    span: EntitySpan,
    confidence: f32,
}

/// Rule-based NER using regex patterns and a gazetteer
pub struct RuleBasedNer {
    /// Pattern rules (regex -> label, confidence)
    patterns: Vec<(Regex, EntityLabel, f32)>,
    /// Known organizations, matched case-sensitively on word boundaries
    dictionary: Vec<DictionaryEntry>,
}

impl RuleBasedNer {
    /// Create a new rule-based NER with the default employer gazetteer
    pub fn new() -> Self {
        let mut ner = Self {
            patterns: Vec::new(),
            dictionary: Vec::new(),
        };

        ner.init_patterns();
        ner.init_org_dictionary();
        ner
    }

    /// Initialize regex patterns
    fn init_patterns(&mut self) {
        // Capitalized names followed by a corporate suffix: "Acme Robotics Inc", "Initech, LLC"
        self.add_pattern(
            r"\b[A-Z][\w&]*(?:\s+[A-Z][\w&]*){0,3},?\s+(?:Inc|LLC|Ltd|Corp|Corporation|Technologies|Labs|Systems|Group)\b",
            EntityLabel::Org,
            0.85,
        );

        // Dates
        self.add_pattern(r"\b\d{4}-\d{1,2}-\d{1,2}\b", EntityLabel::Date, 0.95);
        self.add_pattern(r"\b\d{1,2}/\d{1,2}/\d{4}\b", EntityLabel::Date, 0.95);
        self.add_pattern(
            r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(?:,\s*\d{4})?\b",
            EntityLabel::Date,
            0.9,
        );
    }

    /// Initialize the employer gazetteer
    fn init_org_dictionary(&mut self) {
        self.add_term("Amazon", vec!["AWS", "Amazon Web Services"]);
        self.add_term("Google", vec!["Alphabet", "DeepMind"]);
        self.add_term("Meta", vec!["Facebook", "Instagram"]);
        self.add_term("Microsoft", vec!["MSFT"]);
        self.add_term("Apple", vec![]);
        self.add_term("Netflix", vec![]);
        self.add_term("Stripe", vec![]);
        self.add_term("Airbnb", vec![]);
        self.add_term("Uber", vec![]);
        self.add_term("Lyft", vec![]);
        self.add_term("Salesforce", vec![]);
        self.add_term("Shopify", vec![]);
        self.add_term("Coinbase", vec![]);
        self.add_term("Databricks", vec![]);
        self.add_term("Snowflake", vec![]);
        self.add_term("NVIDIA", vec!["Nvidia"]);
        self.add_term("IBM", vec![]);
        self.add_term("Oracle", vec![]);
        self.add_term("Adobe", vec![]);
        self.add_term("Intel", vec![]);
        self.add_term("Spotify", vec![]);
        self.add_term("LinkedIn", vec![]);
        self.add_term("Atlassian", vec![]);
        self.add_term("Palantir", vec![]);
        self.add_term("Twilio", vec![]);
        self.add_term("Datadog", vec![]);
        self.add_term("Cloudflare", vec![]);
        self.add_term("Robinhood", vec![]);
        self.add_term("DoorDash", vec![]);
        self.add_term("Pinterest", vec![]);
        self.add_term("Dropbox", vec![]);
    }

    /// Add a regex pattern
    fn add_pattern(&mut self, pattern: &str, label: EntityLabel, confidence: f32) {
        match Regex::new(pattern) {
            Ok(regex) => self.patterns.push((regex, label, confidence)),
            Err(e) => warn!("Skipping invalid NER pattern {pattern}: {e}"),
        }
    }

    /// Add an organization to the gazetteer
    fn add_term(&mut self, term: &str, aliases: Vec<&str>) {
        self.dictionary.push(DictionaryEntry {
            term: term.to_string(),
            label: EntityLabel::Org,
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
        });
    }

    /// Extract entities using pattern matching
    fn extract_by_patterns(&self, text: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (regex, label, confidence) in &self.patterns {
            for mat in regex.find_iter(text) {
                candidates.push(Candidate {
                    span: EntitySpan::new(mat.as_str(), *label, mat.start()),
                    confidence: *confidence,
                });
            }
        }

        candidates
    }

    /// Extract entities using gazetteer lookup
    fn extract_by_dictionary(&self, text: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for entry in &self.dictionary {
            let names = std::iter::once((&entry.term, 0.95))
                .chain(entry.aliases.iter().map(|alias| (alias, 0.9)));

            for (name, confidence) in names {
                let mut offset = 0;
                while let Some(pos) = find_word(&text[offset..], name) {
                    let start = offset + pos;
                    candidates.push(Candidate {
                        span: EntitySpan::new(name.as_str(), entry.label, start),
                        confidence,
                    });
                    offset = start + name.len();
                }
            }
        }

        candidates
    }

    /// Remove overlapping candidates; earlier spans win, ties go to higher confidence
    fn deduplicate(&self, mut candidates: Vec<Candidate>) -> Vec<EntitySpan> {
        candidates.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then(b.confidence.total_cmp(&a.confidence))
        });

        let mut result = Vec::new();
        let mut covered: HashSet<usize> = HashSet::new();

        for candidate in candidates {
            let range = candidate.span.start..candidate.span.end;
            if range.clone().any(|i| covered.contains(&i)) {
                continue;
            }
            covered.extend(range);
            result.push(candidate.span);
        }

        result
    }
}

impl Default for RuleBasedNer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityTagger for RuleBasedNer {
    async fn tag(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let mut candidates = self.extract_by_patterns(text);
        candidates.extend(self.extract_by_dictionary(text));
        Ok(self.deduplicate(candidates))
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}

// ============================================================================
// Remote NER
// ============================================================================

/// Client for an HTTP NER service
///
/// Protocol: `POST {base_url}/ner` with `{"text": ...}`, answered by
/// `{"entities": [{"text", "label", "start"?, "end"?}]}` in source order.
pub struct RemoteNer {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct NerResponse {
    #[serde(default)]
    entities: Vec<RemoteEntity>,
}

#[derive(Debug, Deserialize)]
struct RemoteEntity {
    text: String,
    label: String,
    start: Option<usize>,
    end: Option<usize>,
}

impl RemoteNer {
    /// Create a client with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JobmailError::Ner(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create from config
    pub fn from_config(config: &NerConfig) -> Result<Self> {
        Self::new(&config.remote_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert service entities into spans, locating missing offsets in `text`
    fn into_spans(entities: Vec<RemoteEntity>, text: &str) -> Vec<EntitySpan> {
        entities
            .into_iter()
            .filter_map(|e| {
                let label = EntityLabel::from_label(&e.label);
                match (e.start, e.end) {
                    (Some(start), Some(end)) => Some(EntitySpan {
                        text: e.text,
                        label,
                        start,
                        end,
                    }),
                    _ => text
                        .find(&e.text)
                        .map(|start| EntitySpan::new(e.text, label, start)),
                }
            })
            .collect()
    }
}

#[async_trait]
impl EntityTagger for RemoteNer {
    async fn tag(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let response = self
            .client
            .post(format!("{}/ner", self.base_url))
            .json(&NerRequest { text })
            .send()
            .await
            .map_err(|e| JobmailError::Ner(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(JobmailError::Ner(format!(
                "NER service returned {status}: {error_text}"
            )));
        }

        let result: NerResponse = response
            .json()
            .await
            .map_err(|e| JobmailError::Ner(format!("Failed to parse response: {e}")))?;

        debug!(count = result.entities.len(), "Remote NER tagged entities");
        Ok(Self::into_spans(result.entities, text))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Build the tagger selected by configuration
pub fn build_tagger(config: &NerConfig) -> Result<Arc<dyn EntityTagger>> {
    let tagger: Arc<dyn EntityTagger> = match config.provider {
        NerProvider::Rules => Arc::new(RuleBasedNer::new()),
        NerProvider::Remote => Arc::new(RemoteNer::from_config(config)?),
    };
    Ok(tagger)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    fn orgs(spans: &[EntitySpan]) -> Vec<&str> {
        spans
            .iter()
            .filter(|s| s.is_org())
            .map(|s| s.text.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_rule_based_gazetteer() {
        let ner = RuleBasedNer::new();
        let spans = ner
            .tag("Our team at Stripe works closely with AWS.")
            .await
            .unwrap();

        assert_eq!(orgs(&spans), vec!["Stripe", "AWS"]);
        assert!(spans[0].start < spans[1].start);
    }

    #[tokio::test]
    async fn test_rule_based_requires_word_boundary_and_case() {
        let ner = RuleBasedNer::new();
        let spans = ner
            .tag("We use metadata and an apple a day; Stripes are fine.")
            .await
            .unwrap();

        assert!(orgs(&spans).is_empty());
    }

    #[tokio::test]
    async fn test_rule_based_corporate_suffix() {
        let ner = RuleBasedNer::new();
        let spans = ner
            .tag("Thank you for your interest in Acme Robotics Inc and our mission.")
            .await
            .unwrap();

        assert_eq!(orgs(&spans), vec!["Acme Robotics Inc"]);
    }

    #[tokio::test]
    async fn test_rule_based_overlap_prefers_higher_confidence() {
        let ner = RuleBasedNer::new();
        let spans = ner.tag("Offer from Stripe, Inc today").await.unwrap();

        // "Stripe, Inc" (pattern) and "Stripe" (gazetteer) share a start
        assert_eq!(orgs(&spans), vec!["Stripe"]);
    }

    #[tokio::test]
    async fn test_rule_based_dates() {
        let ner = RuleBasedNer::new();
        let spans = ner
            .tag("Interview on March 3, 2025 or 2025-03-04")
            .await
            .unwrap();

        let dates: Vec<_> = spans
            .iter()
            .filter(|s| s.label == EntityLabel::Date)
            .collect();
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn test_remote_spans_locate_missing_offsets() {
        let entities = vec![
            RemoteEntity {
                text: "Stripe".to_string(),
                label: "ORG".to_string(),
                start: None,
                end: None,
            },
            RemoteEntity {
                text: "Nowhere".to_string(),
                label: "GPE".to_string(),
                start: None,
                end: None,
            },
        ];

        let spans = RemoteNer::into_spans(entities, "Hello from Stripe");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 11);
        assert!(spans[0].is_org());
    }

    async fn spawn_ner_service(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_remote_ner_round_trip() {
        let router = Router::new().route(
            "/ner",
            post(|Json(body): Json<Value>| async move {
                assert!(body["text"].as_str().unwrap().contains("Stripe"));
                Json(json!({
                    "entities": [
                        {"text": "Stripe", "label": "ORG", "start": 9, "end": 15},
                        {"text": "Dublin", "label": "GPE"}
                    ]
                }))
            }),
        );
        let url = spawn_ner_service(router).await;

        let ner = RemoteNer::new(format!("{url}/"), Duration::from_secs(5)).unwrap();
        let spans = ner.tag("Join us: Stripe in Dublin").await.unwrap();

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Stripe");
        assert!(spans[0].is_org());
        assert_eq!(spans[1].label, EntityLabel::Location);
        assert_eq!(spans[1].start, 19);
    }

    #[tokio::test]
    async fn test_remote_ner_error_status() {
        let router = Router::new().route(
            "/ner",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
        );
        let url = spawn_ner_service(router).await;

        let ner = RemoteNer::new(url, Duration::from_secs(5)).unwrap();
        let err = ner.tag("anything").await.unwrap_err();

        assert!(matches!(err, JobmailError::Ner(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_remote_ner_unreachable() {
        let ner = RemoteNer::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = ner.tag("anything").await.unwrap_err();
        assert!(matches!(err, JobmailError::Ner(_)));
    }

    #[test]
    fn test_build_tagger_from_config() {
        let tagger = build_tagger(&NerConfig::default()).unwrap();
        assert_eq!(tagger.name(), "rules");

        let config = NerConfig {
            provider: NerProvider::Remote,
            ..NerConfig::default()
        };
        assert_eq!(build_tagger(&config).unwrap().name(), "remote");
    }
}

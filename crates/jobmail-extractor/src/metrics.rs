//! Extraction quality metrics
//!
//! Field-level precision, recall, F1 and accuracy of the pipeline over a
//! labelled corpus of emails.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::pipeline::EmailParser;
use jobmail_core::{EmailInput, ExtractionResult, JobmailError, Result};

// ============================================================================
// Labelled Samples
// ============================================================================

/// One email with the company and position a human expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledEmail {
    #[serde(flatten)]
    pub email: EmailInput,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

/// Read a JSON Lines corpus; blank lines are skipped
pub fn load_labeled(path: impl AsRef<Path>) -> Result<Vec<LabeledEmail>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read corpus {}", path.display()))?;
    parse_labeled(&content)
}

/// Parse JSON Lines content into labelled samples
pub fn parse_labeled(content: &str) -> Result<Vec<LabeledEmail>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| JobmailError::InvalidInput(format!("line {}: {e}", idx + 1)))
        })
        .collect()
}

// ============================================================================
// Field Metrics
// ============================================================================

/// Confusion counts for one extracted field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetrics {
    /// Predicted value equals the label
    pub true_positives: usize,
    /// Predicted a value that is not the label
    pub false_positives: usize,
    /// Label present but not predicted (or predicted wrongly)
    pub false_negatives: usize,
    /// Prediction agrees with the label, including both absent
    pub correct: usize,
    pub total: usize,
}

impl FieldMetrics {
    /// Calculate precision (TP / (TP + FP))
    pub fn precision(&self) -> f32 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// Calculate recall (TP / (TP + FN))
    pub fn recall(&self) -> f32 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn accuracy(&self) -> f32 {
        ratio(self.correct, self.total)
    }

    fn record(&mut self, predicted: Option<&str>, gold: Option<&str>) {
        self.total += 1;
        match (predicted, gold) {
            (Some(p), Some(g)) if normalize(p) == normalize(g) => {
                self.true_positives += 1;
                self.correct += 1;
            }
            (Some(_), Some(_)) => {
                self.false_positives += 1;
                self.false_negatives += 1;
            }
            (Some(_), None) => self.false_positives += 1,
            (None, Some(_)) => self.false_negatives += 1,
            (None, None) => self.correct += 1,
        }
    }

    fn merge(&mut self, other: &FieldMetrics) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.correct += other.correct;
        self.total += other.total;
    }
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

/// Case- and whitespace-insensitive comparison key
fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ============================================================================
// Evaluator
// ============================================================================

/// Metrics for a single labelled email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMetrics {
    pub company: FieldMetrics,
    pub position: FieldMetrics,
}

/// Compares pipeline output with labels
#[derive(Debug, Clone, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Score one prediction against its label
    pub fn evaluate_sample(&self, predicted: &ExtractionResult, gold: &LabeledEmail) -> SampleMetrics {
        let mut metrics = SampleMetrics::default();
        metrics
            .company
            .record(predicted.company.as_deref(), gold.company.as_deref());
        metrics
            .position
            .record(predicted.position.as_deref(), gold.position.as_deref());
        metrics
    }

    /// Run the parser over every sample and aggregate the results.
    ///
    /// A sample whose parse fails is counted in `failures` and skipped.
    pub async fn evaluate(&self, parser: &EmailParser, samples: &[LabeledEmail]) -> AggregateMetrics {
        let mut aggregate = AggregateMetrics::default();

        for (idx, sample) in samples.iter().enumerate() {
            match parser.parse(&sample.email).await {
                Ok(result) => {
                    aggregate.add(&self.evaluate_sample(&result, sample));
                    aggregate.confidence_sum += f64::from(result.confidence_score);
                }
                Err(e) => {
                    warn!(sample = idx, error = %e, "Parse failed during evaluation");
                    aggregate.failures += 1;
                }
            }
        }

        aggregate
    }
}

// ============================================================================
// Aggregate Metrics
// ============================================================================

/// Aggregate metrics for a corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub company: FieldMetrics,
    pub position: FieldMetrics,
    pub num_emails: usize,
    pub failures: usize,
    pub confidence_sum: f64,
}

impl AggregateMetrics {
    pub fn add(&mut self, sample: &SampleMetrics) {
        self.company.merge(&sample.company);
        self.position.merge(&sample.position);
        self.num_emails += 1;
    }

    pub fn mean_confidence(&self) -> f64 {
        if self.num_emails == 0 {
            0.0
        } else {
            self.confidence_sum / self.num_emails as f64
        }
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        format!(
            "=== Extraction Quality Report ===\n\n\
             Emails evaluated: {} (failed: {})\n\
             Mean confidence:  {:.2}\n\n\
             {}\n\
             {}",
            self.num_emails,
            self.failures,
            self.mean_confidence(),
            field_report("Company", &self.company),
            field_report("Position", &self.position),
        )
    }
}

fn field_report(name: &str, m: &FieldMetrics) -> String {
    format!(
        "{name}:\n\
           Accuracy:  {:.1}%\n\
           Precision: {:.1}%\n\
           Recall:    {:.1}%\n\
           F1 Score:  {:.1}%\n\
           TP: {} | FP: {} | FN: {}\n",
        m.accuracy() * 100.0,
        m.precision() * 100.0,
        m.recall() * 100.0,
        m.f1_score() * 100.0,
        m.true_positives,
        m.false_positives,
        m.false_negatives,
    )
}

// ============================================================================
// Tests
// ============================================================================

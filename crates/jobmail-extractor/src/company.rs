//! Company resolution
//!
//! An ordered list of rules, each yielding an optional company name; the
//! first rule that yields one wins. Default precedence:
//!
//! 1. sender domain (a company's own mail system)
//! 2. introductory phrases in the text ("applying to ...")
//! 3. NER organizations
//! 4. alias scan over the text
//!
//! Every rule is also exposed as a free function so it can be exercised alone.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::text::{non_empty, title_case, trim_punctuation};
use crate::EntityTagger;
use jobmail_core::{combined_text, EntitySpan, Lexicon, Result};

/// Characters considered after an indicator phrase
const PHRASE_WINDOW_CHARS: usize = 50;

/// A single company resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyRule {
    SenderDomain,
    PhraseIndicator,
    NamedEntity,
    AliasScan,
}

impl CompanyRule {
    /// Default precedence, highest first
    pub const PRECEDENCE: [CompanyRule; 4] = [
        CompanyRule::SenderDomain,
        CompanyRule::PhraseIndicator,
        CompanyRule::NamedEntity,
        CompanyRule::AliasScan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SenderDomain => "sender_domain",
            Self::PhraseIndicator => "phrase_indicator",
            Self::NamedEntity => "named_entity",
            Self::AliasScan => "alias_scan",
        }
    }
}

impl std::fmt::Display for CompanyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved company and the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyMatch {
    pub name: String,
    pub rule: CompanyRule,
}

/// Resolves the employer named by an email
pub struct CompanyResolver {
    lexicon: Arc<Lexicon>,
    tagger: Arc<dyn EntityTagger>,
    rules: Vec<CompanyRule>,
}

impl CompanyResolver {
    /// Create a resolver with the default rule precedence
    pub fn new(lexicon: Arc<Lexicon>, tagger: Arc<dyn EntityTagger>) -> Self {
        Self {
            lexicon,
            tagger,
            rules: CompanyRule::PRECEDENCE.to_vec(),
        }
    }

    /// Replace the rule list (order is precedence)
    pub fn with_rules(mut self, rules: Vec<CompanyRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &[CompanyRule] {
        &self.rules
    }

    /// Run the rules in order and return the first company found.
    ///
    /// The tagger is only invoked when the named-entity rule is reached and
    /// there is text to tag; its failure is the only error.
    pub async fn resolve(
        &self,
        subject: &str,
        body: &str,
        sender_address: &str,
    ) -> Result<Option<CompanyMatch>> {
        let text = combined_text(subject, body);

        for &rule in &self.rules {
            let found = match rule {
                CompanyRule::SenderDomain => sender_domain_rule(&self.lexicon, sender_address),
                CompanyRule::PhraseIndicator => phrase_indicator_rule(&self.lexicon, &text),
                CompanyRule::NamedEntity => {
                    if text.trim().is_empty() {
                        None
                    } else {
                        let spans = self.tagger.tag(&text).await?;
                        named_entity_rule(&self.lexicon, &spans)
                    }
                }
                CompanyRule::AliasScan => alias_scan_rule(&self.lexicon, &text),
            };

            if let Some(name) = found.as_deref().and_then(non_empty) {
                debug!(rule = %rule, company = %name, "Company resolved");
                return Ok(Some(CompanyMatch { name, rule }));
            }
        }

        debug!("No company signal found");
        Ok(None)
    }
}

/// Lowercase domain label between `@` and the first `.`; `None` when the
/// address has no `@` or the label is not a plain hostname label
pub fn sender_domain(sender_address: &str) -> Option<String> {
    let (_, host) = sender_address.trim().rsplit_once('@')?;
    let label = host
        .split('.')
        .next()?
        .trim_end_matches('>')
        .trim()
        .to_lowercase();

    let valid = !label.is_empty() && label.chars().all(|c| c.is_alphanumeric() || c == '-');
    valid.then_some(label)
}

/// Alias for the sender's domain, else the title-cased domain unless it is a
/// consumer mail provider
pub fn sender_domain_rule(lexicon: &Lexicon, sender_address: &str) -> Option<String> {
    let domain = sender_domain(sender_address)?;

    if let Some(name) = lexicon.aliases.lookup(&domain) {
        return Some(name.to_string());
    }
    if lexicon.is_generic_mail_domain(&domain) {
        return None;
    }
    Some(title_case(&domain))
}

/// Text following the first indicator phrase present, up to the end of the
/// sentence (`.` or `!`) and at most 50 characters
pub fn phrase_indicator_rule(lexicon: &Lexicon, text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();

    for indicator in &lexicon.company_indicators {
        let needle = indicator.to_ascii_lowercase();
        let Some(idx) = lower.find(&needle) else {
            continue;
        };

        let window: String = text[idx + needle.len()..]
            .chars()
            .take(PHRASE_WINDOW_CHARS)
            .collect();
        let sentence = window
            .trim_start()
            .split(&['.', '!'][..])
            .next()
            .unwrap_or_default();
        let candidate = trim_punctuation(sentence);

        if candidate.is_empty() {
            continue;
        }

        let name = lexicon.aliases.lookup(candidate).unwrap_or(candidate);
        return Some(name.to_string());
    }

    None
}

/// First ORG span naming a known alias, else the first ORG span
pub fn named_entity_rule(lexicon: &Lexicon, spans: &[EntitySpan]) -> Option<String> {
    let orgs: Vec<&str> = spans
        .iter()
        .filter(|s| s.is_org())
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect();

    orgs.iter()
        .find_map(|org| lexicon.aliases.lookup(org))
        .or_else(|| orgs.first().copied())
        .map(str::to_string)
}

/// First alias (in table order) mentioned anywhere in the text
pub fn alias_scan_rule(lexicon: &Lexicon, text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    lexicon
        .aliases
        .iter()
        .find(|entry| lower.contains(entry.alias.as_str()))
        .map(|entry| entry.name.clone())
}

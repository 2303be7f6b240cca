//! Job title resolution
//!
//! Two phases over `subject + "\n" + body`. The canonical-phrase phase looks
//! for the first catalog title and decorates it with a seniority prefix, a
//! roman-numeral level and cohort modifiers. The keyword-proximity phase runs
//! only when no catalog title occurs and stitches together title-like tokens.

use std::sync::Arc;

use tracing::debug;

use crate::text::capitalize_words;
use jobmail_core::{combined_text, Lexicon};

/// How many words before a title are searched for a seniority prefix
const PREFIX_WINDOW: usize = 3;

struct CatalogPhrase {
    canonical: String,
    lower: String,
}

/// Resolves the job title named by an email
pub struct PositionResolver {
    lexicon: Arc<Lexicon>,
    phrases: Vec<CatalogPhrase>,
    keywords: Vec<String>,
}

impl PositionResolver {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        let phrases = lexicon
            .titles
            .phrases()
            .map(|(_, phrase)| CatalogPhrase {
                canonical: phrase.to_string(),
                lower: phrase.to_ascii_lowercase(),
            })
            .collect();
        let keywords = lexicon
            .position_keywords
            .iter()
            .map(|k| k.to_ascii_lowercase())
            .collect();

        Self {
            lexicon,
            phrases,
            keywords,
        }
    }

    /// Best job title for an email, or `None` when nothing looks like one
    pub fn resolve(&self, subject: &str, body: &str) -> Option<String> {
        let text = combined_text(subject, body);

        if let Some(title) = self.canonical_phrase(&text) {
            debug!(position = %title, "Position resolved from catalog");
            return Some(title);
        }

        let title = self.keyword_proximity(&text);
        if let Some(title) = &title {
            debug!(position = %title, "Position resolved from keywords");
        }
        title
    }

    /// Decorated catalog title for the first catalog phrase found in `text`
    pub fn canonical_phrase(&self, text: &str) -> Option<String> {
        let lower = text.to_ascii_lowercase();

        let (idx, phrase) = self
            .phrases
            .iter()
            .find_map(|p| lower.find(&p.lower).map(|idx| (idx, p)))?;

        let mut components: Vec<String> = Vec::new();

        if let Some(prefix) = self.preceding_prefix(&text[..idx]) {
            components.push(prefix.to_string());
        }

        components.push(phrase.canonical.clone());

        if let Some(level) = self.following_level(&text[idx + phrase.lower.len()..]) {
            components.push(level.to_string());
        }

        for modifier in &self.lexicon.cohort_modifiers {
            let present = components
                .iter()
                .any(|c| c.eq_ignore_ascii_case(modifier));
            if !present && lower.contains(&modifier.to_ascii_lowercase()) {
                components.push(modifier.clone());
            }
        }

        Some(components.join(" "))
    }

    /// Title stitched from keyword-bearing tokens, title-cased
    pub fn keyword_proximity(&self, text: &str) -> Option<String> {
        let lower = text.to_ascii_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        let mut fragments: Vec<String> = Vec::new();

        for (i, word) in words.iter().enumerate() {
            if let Some(prefix) = self.lexicon.seniority_prefix(word) {
                fragments.push(prefix.to_string());
                continue;
            }

            if !self.keywords.iter().any(|k| word.contains(k.as_str())) {
                continue;
            }

            let fragment = match i.checked_sub(1).map(|p| format!("{} {}", words[p], word)) {
                Some(bigram) if lower.contains(&bigram) => bigram,
                _ => word.to_string(),
            };
            fragments.push(fragment);
        }

        if fragments.is_empty() {
            return None;
        }
        Some(capitalize_words(&fragments.join(" ")))
    }

    /// First seniority prefix (in prefix-list order) among the last few words
    fn preceding_prefix(&self, before: &str) -> Option<&str> {
        let words: Vec<&str> = before
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation() && c != '.' && c != '-'))
            .collect();
        let window = &words[words.len().saturating_sub(PREFIX_WINDOW)..];

        self.lexicon
            .seniority_prefixes
            .iter()
            .find(|prefix| window.iter().any(|w| w.eq_ignore_ascii_case(prefix)))
            .map(String::as_str)
    }

    /// First standalone level numeral anywhere after the title
    fn following_level(&self, after: &str) -> Option<&str> {
        after.split_whitespace().find_map(|token| {
            self.lexicon
                .level_suffixes
                .iter()
                .find(|suffix| suffix.as_str() == token)
                .map(String::as_str)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PositionResolver {
        PositionResolver::new(Arc::new(Lexicon::default()))
    }

    #[test]
    fn test_fully_decorated_title() {
        let title = resolver().resolve("Senior Backend Engineer II - New Grad 2025", "");
        assert_eq!(
            title.as_deref(),
            Some("Senior Backend Engineer II New Grad 2025")
        );
    }

    #[test]
    fn test_catalog_phrase_is_canonicalized() {
        let title = resolver().resolve("your application", "We received your FULL STACK DEVELOPER application.");
        assert_eq!(title.as_deref(), Some("Full Stack Developer"));
    }

    #[test]
    fn test_category_order_wins() {
        // frontend precedes software in the catalog
        let title = resolver().resolve("Software Engineer / Frontend Engineer", "");
        assert_eq!(title.as_deref(), Some("Frontend Engineer"));
    }

    #[test]
    fn test_prefix_within_three_words() {
        let r = resolver();
        assert_eq!(
            r.resolve("Sr. and very keen Software Engineer", "").as_deref(),
            Some("Software Engineer")
        );
        assert_eq!(
            r.resolve("Staff, remote Software Engineer", "").as_deref(),
            Some("Staff Software Engineer")
        );
        assert_eq!(
            r.resolve("Role: Sr. Software Engineer", "").as_deref(),
            Some("Sr. Software Engineer")
        );
    }

    #[test]
    fn test_prefix_list_order_decides() {
        // "Senior" precedes "Lead" in the prefix list
        let title = resolver().resolve("Lead Senior Mobile Engineer", "");
        assert_eq!(title.as_deref(), Some("Senior Mobile Engineer"));
    }

    #[test]
    fn test_level_scans_rest_of_text() {
        let r = resolver();
        assert_eq!(
            r.resolve("Software Engineer", "Level: II").as_deref(),
            Some("Software Engineer II")
        );
        // first numeral token after the title wins, wherever it sits
        assert_eq!(
            r.resolve("Software Engineer", "Role details\nBand III then IV").as_deref(),
            Some("Software Engineer III")
        );
    }

    #[test]
    fn test_level_must_be_standalone() {
        let title = resolver().resolve("Software Engineer (II)", "");
        assert_eq!(title.as_deref(), Some("Software Engineer"));
    }

    #[test]
    fn test_modifiers_found_anywhere() {
        let title = resolver().resolve("Android Developer", "Start date: Summer 2024 cohort");
        assert_eq!(title.as_deref(), Some("Android Developer Summer 2024"));
    }

    #[test]
    fn test_modifier_not_duplicated_with_prefix() {
        let title = resolver().resolve("Intern Software Engineer", "");
        assert_eq!(title.as_deref(), Some("Intern Software Engineer"));
    }

    #[test]
    fn test_phrase_matches_inside_longer_words() {
        let r = resolver();
        assert_eq!(
            r.resolve("Now hiring Software Engineers", "").as_deref(),
            Some("Software Engineer")
        );
        assert_eq!(
            r.canonical_phrase("Please answer within a week").as_deref(),
            Some("SWE")
        );
    }

    #[test]
    fn test_modifier_matches_as_substring() {
        let title = resolver().resolve("Backend Engineer", "Posted for internal candidates");
        assert_eq!(title.as_deref(), Some("Backend Engineer Intern"));
    }

    #[test]
    fn test_keyword_proximity_bigram() {
        let title = resolver().resolve("Update", "Hiring: devops engineer");
        assert_eq!(title.as_deref(), Some("Devops Engineer"));

        // a bigram spanning a line break is not verbatim text
        let title = resolver().keyword_proximity("Update\nWeb developer");
        assert_eq!(title.as_deref(), Some("Web Web Developer"));
    }

    #[test]
    fn test_keyword_proximity_with_prefix() {
        let title = resolver().keyword_proximity("junior devops engineer");
        assert_eq!(title.as_deref(), Some("Junior Devops Engineer"));
    }

    #[test]
    fn test_no_position() {
        let r = resolver();
        assert_eq!(r.resolve("", ""), None);
        assert_eq!(r.resolve("Your order has shipped", "Track it online"), None);
    }
}

//! Lookup tables driving extraction
//!
//! Every table here is ordered, and order is precedence: the resolvers walk
//! them front to back and stop at the first hit. A [`Lexicon`] is built once
//! at startup (built-in defaults, optionally overridden from TOML) and shared
//! read-only behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, ExtractionConfig};

// ============================================================================
// Alias Table
// ============================================================================

/// One alias -> canonical company name entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub alias: String,
    pub name: String,
}

/// Ordered mapping from lowercase alias to canonical display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AliasEntry>", into = "Vec<AliasEntry>")]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    /// Build a table; aliases are lowercased and trimmed, later duplicates dropped
    pub fn new(entries: impl IntoIterator<Item = AliasEntry>) -> Self {
        let mut table = Self {
            entries: Vec::new(),
        };
        for entry in entries {
            let alias = entry.alias.trim().to_lowercase();
            if alias.is_empty() || table.lookup(&alias).is_some() {
                continue;
            }
            table.entries.push(AliasEntry {
                alias,
                name: entry.name.trim().to_string(),
            });
        }
        table
    }

    /// Canonical name for an alias (case-insensitive, surrounding whitespace ignored)
    pub fn lookup(&self, alias: &str) -> Option<&str> {
        let key = alias.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.alias == key)
            .map(|e| e.name.as_str())
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<AliasEntry>> for AliasTable {
    fn from(entries: Vec<AliasEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<AliasTable> for Vec<AliasEntry> {
    fn from(table: AliasTable) -> Self {
        table.entries
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(alias, name)| AliasEntry {
            alias: alias.to_string(),
            name: name.to_string(),
        }))
    }
}

// ============================================================================
// Title Catalog
// ============================================================================

/// A named group of canonical title phrases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCategory {
    pub name: String,
    pub phrases: Vec<String>,
}

impl TitleCategory {
    pub fn new(name: &str, phrases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Ordered catalog of canonical job titles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleCatalog {
    categories: Vec<TitleCategory>,
}

impl TitleCatalog {
    pub fn new(categories: Vec<TitleCategory>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[TitleCategory] {
        &self.categories
    }

    /// `(category, phrase)` pairs in precedence order
    pub fn phrases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories.iter().flat_map(|c| {
            c.phrases
                .iter()
                .map(move |p| (c.name.as_str(), p.as_str()))
        })
    }
}

// ============================================================================
// Lexicon
// ============================================================================

/// All lookup tables used by the resolvers and the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Informal company references -> canonical names
    pub aliases: AliasTable,

    /// Consumer mail domains that say nothing about the employer
    pub generic_mail_domains: Vec<String>,

    /// Phrases that introduce a company name in running text
    pub company_indicators: Vec<String>,

    /// Employers scored higher by the confidence rubric
    pub major_employers: Vec<String>,

    /// Canonical title phrases
    pub titles: TitleCatalog,

    /// Seniority words that may precede a title
    pub seniority_prefixes: Vec<String>,

    /// Roman-numeral levels that may follow a title
    pub level_suffixes: Vec<String>,

    /// Cohort/season/year modifiers appended to a title
    pub cohort_modifiers: Vec<String>,

    /// Fragments marking a word as part of a job title
    pub position_keywords: Vec<String>,

    /// Words that earn the position completeness bonus
    pub level_markers: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            aliases: [
                ("aws", "Amazon"),
                ("amazon aws", "Amazon"),
                ("amazon.com", "Amazon"),
                ("amazon", "Amazon"),
                ("meta", "Meta"),
                ("facebook", "Meta"),
                ("google", "Google"),
                ("alphabet", "Google"),
                ("microsoft", "Microsoft"),
                ("msft", "Microsoft"),
                ("apple", "Apple"),
            ]
            .into_iter()
            .collect(),
            generic_mail_domains: strings(&["gmail", "yahoo", "hotmail", "outlook"]),
            company_indicators: strings(&[
                "applying to",
                "application for",
                "role at",
                "position at",
                "joining",
                "welcome to",
            ]),
            major_employers: strings(&["Amazon", "Google", "Meta", "Microsoft", "Apple"]),
            titles: TitleCatalog::new(vec![
                TitleCategory::new(
                    "full_stack",
                    &[
                        "Full Stack Developer",
                        "Full-Stack Developer",
                        "Fullstack Developer",
                        "Full Stack Engineer",
                        "Full-Stack Engineer",
                        "Fullstack Engineer",
                    ],
                ),
                TitleCategory::new(
                    "frontend",
                    &[
                        "Frontend Developer",
                        "Front End Developer",
                        "Front-End Developer",
                        "Frontend Engineer",
                        "Front End Engineer",
                        "Front-End Engineer",
                        "UI Developer",
                        "UI Engineer",
                    ],
                ),
                TitleCategory::new(
                    "backend",
                    &[
                        "Backend Developer",
                        "Back End Developer",
                        "Back-End Developer",
                        "Backend Engineer",
                        "Back End Engineer",
                        "Back-End Engineer",
                    ],
                ),
                TitleCategory::new(
                    "software",
                    &[
                        "Software Engineer",
                        "Software Developer",
                        "SWE",
                        "Software Development Engineer",
                    ],
                ),
                TitleCategory::new(
                    "mobile",
                    &[
                        "Mobile Developer",
                        "Mobile Engineer",
                        "iOS Developer",
                        "Android Developer",
                        "Mobile App Developer",
                    ],
                ),
            ]),
            seniority_prefixes: strings(&[
                "Senior",
                "Lead",
                "Staff",
                "Principal",
                "Junior",
                "Entry-level",
                "Associate",
                "Mid-level",
                "Sr",
                "Sr.",
                "Jr",
                "Jr.",
                "Intern",
            ]),
            level_suffixes: strings(&["I", "II", "III", "IV", "V"]),
            cohort_modifiers: strings(&[
                "New Grad",
                "New Graduate",
                "Intern",
                "Summer",
                "Fall",
                "Spring",
                "Winter",
                "2024",
                "2025",
            ]),
            position_keywords: strings(&[
                "developer",
                "engineer",
                "frontend",
                "backend",
                "full stack",
                "fullstack",
                "full-stack",
                "mobile",
                "ios",
                "android",
                "web",
                "software",
                "swe",
                "development",
            ]),
            level_markers: strings(&[
                "I",
                "II",
                "III",
                "IV",
                "V",
                "Senior",
                "Lead",
                "Staff",
                "Principal",
                "Sr",
                "Sr.",
                "New Grad",
            ]),
        }
    }
}

impl Lexicon {
    /// Load a lexicon from a TOML file; omitted tables keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: PathBuf::from(path),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from(path),
            message: e.to_string(),
        })
    }

    /// Built-in tables, or the file named by the extraction config
    pub fn load(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        match &config.lexicon_path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Whether a lowercase domain label belongs to a consumer mail provider
    pub fn is_generic_mail_domain(&self, domain: &str) -> bool {
        self.generic_mail_domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(domain))
    }

    pub fn is_major_employer(&self, company: &str) -> bool {
        self.major_employers.iter().any(|c| c == company)
    }

    /// Seniority prefix matching `word` case-insensitively, in canonical form
    pub fn seniority_prefix(&self, word: &str) -> Option<&str> {
        self.seniority_prefixes
            .iter()
            .find(|p| p.eq_ignore_ascii_case(word))
            .map(String::as_str)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_lookup_is_case_insensitive() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.aliases.lookup("AWS"), Some("Amazon"));
        assert_eq!(lexicon.aliases.lookup(" Facebook "), Some("Meta"));
        assert_eq!(lexicon.aliases.lookup("stripe"), None);
    }

    #[test]
    fn test_alias_table_keeps_first_duplicate() {
        let table: AliasTable = [("fb", "Meta"), ("FB", "Facebook")].into_iter().collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("fb"), Some("Meta"));
    }

    #[test]
    fn test_title_catalog_order() {
        let lexicon = Lexicon::default();
        let first: Vec<_> = lexicon.titles.phrases().take(2).collect();
        assert_eq!(
            first,
            vec![
                ("full_stack", "Full Stack Developer"),
                ("full_stack", "Full-Stack Developer")
            ]
        );
        assert_eq!(lexicon.titles.categories().len(), 5);
    }

    #[test]
    fn test_seniority_prefix_canonical_form() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.seniority_prefix("senior"), Some("Senior"));
        assert_eq!(lexicon.seniority_prefix("SR."), Some("Sr."));
        assert_eq!(lexicon.seniority_prefix("engineer"), None);
    }

    #[test]
    fn test_generic_domains() {
        let lexicon = Lexicon::default();
        assert!(lexicon.is_generic_mail_domain("gmail"));
        assert!(!lexicon.is_generic_mail_domain("stripe"));
    }

    #[test]
    fn test_toml_override_keeps_other_defaults() {
        let lexicon: Lexicon = toml::from_str(
            r#"
            major_employers = ["Stripe"]

            [[aliases]]
            alias = "Stripe Inc"
            name = "Stripe"
            "#,
        )
        .unwrap();

        assert_eq!(lexicon.aliases.lookup("stripe inc"), Some("Stripe"));
        assert_eq!(lexicon.aliases.len(), 1);
        assert!(lexicon.is_major_employer("Stripe"));
        assert_eq!(lexicon.generic_mail_domains.len(), 4);
        assert_eq!(lexicon.titles, Lexicon::default().titles);
    }
}

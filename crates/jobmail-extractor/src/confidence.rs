//! Point-additive confidence rubric

use std::sync::Arc;

use crate::text::find_word;
use jobmail_core::{Lexicon, POSITION_NOT_FOUND, UNKNOWN_COMPANY};

const MAJOR_EMPLOYER_POINTS: f32 = 0.6;
const COMPANY_POINTS: f32 = 0.4;
const POSITION_POINTS: f32 = 0.4;
const LEVEL_BONUS: f32 = 0.1;

/// Scores how complete an extraction looks, in `[0, 1]`
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    lexicon: Arc<Lexicon>,
}

impl ConfidenceScorer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Combine resolved fields into a score.
    ///
    /// Placeholders count as absent. The level bonus needs a level marker as
    /// a word of the position (case-sensitive).
    pub fn score(&self, company: Option<&str>, position: Option<&str>) -> f32 {
        let company_points = match company.map(str::trim) {
            None | Some("") | Some(UNKNOWN_COMPANY) => 0.0,
            Some(name) if self.lexicon.is_major_employer(name) => MAJOR_EMPLOYER_POINTS,
            Some(_) => COMPANY_POINTS,
        };

        let position_points = match position.map(str::trim) {
            None | Some("") | Some(POSITION_NOT_FOUND) => 0.0,
            Some(title) if self.has_level_marker(title) => POSITION_POINTS + LEVEL_BONUS,
            Some(_) => POSITION_POINTS,
        };

        (company_points + position_points).clamp(0.0, 1.0)
    }

    fn has_level_marker(&self, title: &str) -> bool {
        self.lexicon
            .level_markers
            .iter()
            .any(|marker| marker_in(title, marker))
    }
}

/// Single-word markers must equal a whitespace-delimited word of the title;
/// multi-word markers (`New Grad`) match on word boundaries
fn marker_in(title: &str, marker: &str) -> bool {
    if marker.contains(char::is_whitespace) {
        find_word(title, marker).is_some()
    } else {
        title.split_whitespace().any(|word| word == marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::new(Arc::new(Lexicon::default()))
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_major_employer_with_level_caps_at_one() {
        let s = scorer().score(Some("Google"), Some("Senior Software Engineer"));
        assert!(approx(s, 1.0));
    }

    #[test]
    fn test_other_company_and_plain_position() {
        let s = scorer().score(Some("Stripe"), Some("Backend Engineer"));
        assert!(approx(s, 0.8));
    }

    #[test]
    fn test_other_company_with_level() {
        let s = scorer().score(Some("Stripe"), Some("Backend Engineer II"));
        assert!(approx(s, 0.9));
    }

    #[test]
    fn test_absent_fields_score_zero() {
        let s = scorer();
        assert!(approx(s.score(None, None), 0.0));
        assert!(approx(s.score(Some(UNKNOWN_COMPANY), Some(POSITION_NOT_FOUND)), 0.0));
        assert!(approx(s.score(Some("  "), None), 0.0));
    }

    #[test]
    fn test_level_marker_must_be_whole_word() {
        let s = scorer();
        // "I" inside "UI" or "Intern" earns nothing
        assert!(approx(s.score(None, Some("UI Developer")), 0.4));
        assert!(approx(s.score(None, Some("Intern Software Engineer")), 0.4));
        assert!(approx(s.score(None, Some("Software Engineer New Grad")), 0.5));
        assert!(approx(s.score(None, Some("Sr. Software Engineer")), 0.5));
        assert!(approx(s.score(None, Some("Senior-ish Engineer")), 0.4));
    }

    #[test]
    fn test_major_employer_match_is_exact() {
        let s = scorer();
        assert!(approx(s.score(Some("Amazon"), None), 0.6));
        assert!(approx(s.score(Some("amazon"), None), 0.4));
    }
}

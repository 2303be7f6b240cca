//! End-to-end behaviour of the extraction pipeline

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;

use jobmail_core::{EmailInput, EntityLabel, EntitySpan, Lexicon, Result};
use jobmail_extractor::{EmailParser, EntityTagger, RuleBasedNer};

/// Tagger that reports a fixed ORG list and counts how often it runs
struct ScriptedTagger {
    orgs: Vec<&'static str>,
    calls: AtomicUsize,
}

impl ScriptedTagger {
    fn new(orgs: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            orgs,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityTagger for ScriptedTagger {
    async fn tag(&self, _text: &str) -> Result<Vec<EntitySpan>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .orgs
            .iter()
            .map(|o| EntitySpan::new(*o, EntityLabel::Org, 0))
            .collect())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn parser_with(tagger: Arc<dyn EntityTagger>) -> EmailParser {
    EmailParser::new(Arc::new(Lexicon::default()), tagger)
}

#[tokio::test]
async fn test_alias_domain_without_ner() {
    let tagger = ScriptedTagger::new(vec!["Stripe"]);
    let parser = parser_with(tagger.clone());

    let result = parser
        .parse(&EmailInput::new("Application received", "Thanks!", "jobs@amazon.com"))
        .await
        .unwrap();

    assert_eq!(result.company.as_deref(), Some("Amazon"));
    assert_eq!(tagger.calls(), 0);
}

#[tokio::test]
async fn test_generic_sender_uses_ner_org() {
    let tagger = ScriptedTagger::new(vec!["Stripe"]);
    let parser = parser_with(tagger.clone());

    let result = parser
        .parse(&EmailInput::new("Following up", "Great to meet you", "recruiter@gmail.com"))
        .await
        .unwrap();

    assert_eq!(result.company.as_deref(), Some("Stripe"));
    assert_eq!(tagger.calls(), 1);
}

#[tokio::test]
async fn test_decorated_title_without_ner() {
    let tagger = ScriptedTagger::new(vec![]);
    let parser = parser_with(tagger.clone());

    let result = parser
        .parse(&EmailInput::new(
            "Senior Backend Engineer II - New Grad 2025",
            "",
            "talent@initech.com",
        ))
        .await
        .unwrap();

    assert_eq!(
        result.position.as_deref(),
        Some("Senior Backend Engineer II New Grad 2025")
    );
    assert_eq!(result.company.as_deref(), Some("Initech"));
    assert_eq!(tagger.calls(), 0);
}

#[tokio::test]
async fn test_empty_email() {
    let parser = parser_with(ScriptedTagger::new(vec![]));

    let result = parser
        .parse(&EmailInput::new("", "", "user@gmail.com"))
        .await
        .unwrap();

    assert_eq!(result.company, None);
    assert_eq!(result.position, None);
    assert!(result.confidence_score <= 0.1);
}

#[tokio::test]
async fn test_major_employer_with_level_scores_one() {
    let parser = parser_with(ScriptedTagger::new(vec![]));

    let result = parser
        .parse(&EmailInput::new(
            "Staff Software Engineer",
            "Welcome to Google!",
            "friend@gmail.com",
        ))
        .await
        .unwrap();

    assert_eq!(result.company.as_deref(), Some("Google"));
    assert_eq!(result.position.as_deref(), Some("Staff Software Engineer"));
    assert!((result.confidence_score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_parse_is_idempotent() {
    let parser = parser_with(Arc::new(RuleBasedNer::new()));
    let email = EmailInput::new(
        "Your application for Mobile Engineer",
        "Hi there,\nThe team at Shopify, Inc reviewed your profile.",
        "no-reply@gmail.com",
    );

    let first = parser.parse(&email).await.unwrap();
    let second = parser.parse(&email).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_lexicon_override_changes_aliases() {
    let lexicon: Lexicon = toml::from_str(
        r#"
        major_employers = ["Stripe"]

        [[aliases]]
        alias = "stripe-recruiting"
        name = "Stripe"
        "#,
    )
    .unwrap();
    let parser = EmailParser::new(Arc::new(lexicon), ScriptedTagger::new(vec![]));

    let result = parser
        .parse(&EmailInput::new("Hello", "", "talent@stripe-recruiting.com"))
        .await
        .unwrap();

    assert_eq!(result.company.as_deref(), Some("Stripe"));
    assert!((result.confidence_score - 0.6).abs() < 1e-6);
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9 .,!:@\n-]{0,120}",
        "\\PC{0,60}",
        Just("Senior Full Stack Developer III - Summer 2024 Intern".to_string()),
        Just("Thank you for applying to Meta.".to_string()),
    ]
}

fn sender_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{0,8}@[a-z-]{0,10}\\.[a-z]{2,3}",
        "[a-zA-Z@.<> ]{0,30}",
        Just(String::new()),
    ]
}

proptest! {
    #[test]
    fn confidence_always_in_unit_range(
        subject in text_strategy(),
        body in text_strategy(),
        sender in sender_strategy(),
    ) {
        let parser = parser_with(Arc::new(RuleBasedNer::new()));
        let email = EmailInput::new(subject, body, sender);

        let result = tokio_test::block_on(parser.parse(&email)).unwrap();

        prop_assert!((0.0..=1.0).contains(&result.confidence_score));
        if let Some(company) = &result.company {
            prop_assert!(!company.is_empty());
            prop_assert_eq!(company.trim(), company.as_str());
        }
        if let Some(position) = &result.position {
            prop_assert!(!position.is_empty());
            prop_assert_eq!(position.trim(), position.as_str());
        }
    }
}

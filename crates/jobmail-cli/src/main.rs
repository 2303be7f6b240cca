//! jobmail CLI - Command-line interface
//!
//! Usage:
//!   jobmail parse --subject <s> --body <b> --from <addr>
//!   jobmail classify --from <addr> --subject <s>
//!   jobmail eval <corpus.jsonl>
//!   jobmail dedupe <applications.jsonl>

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobmail_core::{AppConfig, EmailInput, JobApplication, Lexicon};
use jobmail_extractor::metrics::load_labeled;
use jobmail_extractor::{build_tagger, EmailParser, Evaluator, JobEmailClassifier};

#[derive(Parser)]
#[command(name = "jobmail")]
#[command(about = "Extract company and position from job-application emails")]
#[command(version)]
struct Cli {
    /// TOML config file; environment variables take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one email and print the application record as JSON
    Parse {
        #[arg(long, default_value = "")]
        subject: String,
        /// Email body text
        #[arg(long, default_value = "", conflicts_with = "body_file")]
        body: String,
        /// Read the body from a file instead
        #[arg(long)]
        body_file: Option<PathBuf>,
        /// Sender address
        #[arg(long = "from", default_value = "")]
        sender: String,
    },
    /// Decide whether an email looks like a job application
    Classify {
        #[arg(long = "from", default_value = "")]
        sender: String,
        #[arg(long, default_value = "")]
        subject: String,
    },
    /// Measure extraction accuracy over a labelled JSON Lines corpus
    Eval {
        /// Corpus path
        path: PathBuf,
        /// Print metrics as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Report duplicate applications in a JSON Lines file
    Dedupe {
        /// Applications path
        path: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn build_parser(config: &AppConfig) -> anyhow::Result<EmailParser> {
    let lexicon = Lexicon::load(&config.extraction)?;
    let tagger = build_tagger(&config.ner)?;
    Ok(EmailParser::new(Arc::new(lexicon), tagger))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("jobmail_extractor={}", config.logging.level).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse {
            subject,
            body,
            body_file,
            sender,
        } => {
            let body = match body_file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => body,
            };

            let parser = build_parser(&config)?;
            let result = parser
                .parse(&EmailInput::new(subject, body, sender))
                .await?;
            let application = JobApplication::from_extraction(&result, chrono::Utc::now());
            println!("{}", serde_json::to_string_pretty(&application)?);
        }
        Commands::Classify { sender, subject } => {
            let classification = JobEmailClassifier::new().classify(&sender, &subject);
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        Commands::Eval { path, json } => {
            let samples = load_labeled(&path)?;
            tracing::info!(samples = samples.len(), path = %path.display(), "Evaluating corpus");

            let parser = build_parser(&config)?;
            let metrics = Evaluator::new().evaluate(&parser, &samples).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print!("{}", metrics.report());
            }
        }
        Commands::Dedupe { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let applications = content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(idx, line)| {
                    serde_json::from_str::<JobApplication>(line)
                        .map(|app| (idx + 1, app))
                        .with_context(|| format!("line {}", idx + 1))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            let mut kept: Vec<&(usize, JobApplication)> = Vec::new();
            for entry in &applications {
                let (line, app) = entry;
                match kept.iter().find(|(_, k)| app.is_duplicate(k)) {
                    Some((original, _)) => {
                        println!(
                            "line {line}: duplicate of line {original} ({} / {})",
                            app.company, app.position
                        );
                    }
                    None => kept.push(entry),
                }
            }

            println!(
                "{} applications, {} unique",
                applications.len(),
                kept.len()
            );
        }
    }

    Ok(())
}

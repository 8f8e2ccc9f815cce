//! flag-detector - classify relationship behavior as red or green flags
//!
//! Usage:
//!   flag-detector classify "he reads my messages without asking"
//!   flag-detector classify --fallback "she listens when I talk"
//!   flag-detector batch "first behavior" "second behavior"
//!   flag-detector batch --file behaviors.txt
//!   flag-detector local "he always checks my phone"
//!   flag-detector analyze "we never talk about money" --type communication

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use flag_detector::config::Config;
use flag_detector::{
    AnalysisType, ClassificationRequest, ClassificationSource, FlagClassifier, FlagKind,
    FlagResult, Severity,
};

#[derive(Parser)]
#[command(name = "flag-detector")]
#[command(about = "Red flag / green flag relationship behavior classifier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one description through the remote service
    Classify {
        text: String,
        /// Answer from the rule engine if the remote service fails
        #[arg(long)]
        fallback: bool,
    },
    /// Classify several descriptions in a single remote exchange
    Batch {
        texts: Vec<String>,
        /// Read one description per line from a file
        #[arg(long, short)]
        file: Option<PathBuf>,
    },
    /// Classify with the offline rule engine only
    Local { text: String },
    /// Extended assessment with flag lists, score and communication patterns
    Analyze {
        text: String,
        #[arg(long = "type", default_value = "general")]
        analysis_type: AnalysisType,
        #[arg(long)]
        context: Option<String>,
    },
}

#[derive(Serialize)]
struct Report<'a, T: Serialize> {
    input: &'a str,
    result: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ClassificationSource>,
    analyzed_at: DateTime<Utc>,
}

impl<'a, T: Serialize> Report<'a, T> {
    fn new(input: &'a str, result: T, source: Option<ClassificationSource>) -> Self {
        Self {
            input,
            result,
            source,
            analyzed_at: Utc::now(),
        }
    }
}

/// Generic result shown in place of a classification when the remote path fails
fn analysis_error_result() -> FlagResult {
    FlagResult {
        kind: FlagKind::Red,
        label: "Analysis Error".to_string(),
        explanation: "Failed to analyze input. Please check your connection and try again."
            .to_string(),
        confidence: 0,
        emoji: "⚠️".to_string(),
        severity: Severity::Mild,
        category: "System".to_string(),
        psychology_basis: "Technical error occurred".to_string(),
        action_advice: "Please try again in a moment".to_string(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_batch_inputs(texts: Vec<String>, file: Option<PathBuf>) -> Result<Vec<String>> {
    let mut inputs = texts;
    if let Some(path) = file {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read batch file {}", path.display()))?;
        inputs.extend(content.lines().map(str::to_string));
    }
    Ok(inputs)
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Local { text } => {
            let result = flag_detector::rules::classify_locally(&text);
            print_json(&Report::new(&text, result, Some(ClassificationSource::Local)))
        }
        Commands::Classify { text, fallback } => {
            let mut config = config;
            if fallback {
                config.classification.fallback_to_rules = true;
            }
            let classifier = FlagClassifier::from_config(&config)?;
            match classifier.classify_with_fallback(&text).await {
                Ok(classified) => print_json(&Report::new(
                    &text,
                    classified.result,
                    Some(classified.source),
                )),
                Err(e) => {
                    print_json(&Report::new(&text, analysis_error_result(), None))?;
                    Err(e).context("Classification failed")
                }
            }
        }
        Commands::Batch { texts, file } => {
            let inputs = read_batch_inputs(texts, file)?;
            let classifier = FlagClassifier::from_config(&config)?;
            let retained = flag_detector::batch::retain_non_empty(&inputs);
            let results = match classifier.classify_batch(&inputs).await {
                Ok(results) => results,
                Err(e) => {
                    let reports: Vec<_> = retained
                        .iter()
                        .map(|input| Report::new(input.as_str(), analysis_error_result(), None))
                        .collect();
                    print_json(&reports)?;
                    return Err(e).context("Batch classification failed");
                }
            };
            let reports: Vec<_> = retained
                .iter()
                .zip(results)
                .map(|(input, result)| {
                    Report::new(input.as_str(), result, Some(ClassificationSource::Remote))
                })
                .collect();
            print_json(&reports)
        }
        Commands::Analyze {
            text,
            analysis_type,
            context,
        } => {
            let classifier = FlagClassifier::from_config(&config)?;
            let mut request = ClassificationRequest::new(text.clone()).with_analysis_type(analysis_type);
            if let Some(context) = context {
                request = request.with_context(context);
            }
            match classifier.classify_content(&request).await {
                Ok(assessment) => print_json(&Report::new(
                    &text,
                    assessment,
                    Some(ClassificationSource::Remote),
                )),
                Err(e) => {
                    print_json(&Report::new(&text, analysis_error_result(), None))?;
                    Err(e).context("Content analysis failed")
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.runtime.log_level)
                .unwrap_or_else(|_| "flag_detector=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(model = %config.remote.model, "flag-detector starting");

    run(cli, config).await
}

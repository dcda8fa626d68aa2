//! RAGGuard - dual-path question answering CLI
//!
//! The `ragguard` command answers a question from retrieved documents and
//! the model's own knowledge, refusing to repeat speculative or poisoned
//! passages.
//!
//! ## Commands
//!
//! - `ask`: Answer a question over documents given on the command line
//! - `demo`: Run an embedded poisoned or clean retrieval scenario
//! - `config`: Show the effective completion endpoint configuration

mod input;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ragguard_core::{ArbitrationMode, DocumentSet, Pipeline, PipelineConfig, Query, Scenario};
use ragguard_llm::{CompletionConfig, OpenAiCompatClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "ragguard")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Retrieval-augmented answering with poisoned-retrieval arbitration", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    endpoint: EndpointArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EndpointArgs {
    /// Base URL of an OpenAI-compatible API
    #[arg(long, global = true, env = "RAGGUARD_BASE_URL", default_value = "http://localhost:11434/v1")]
    base_url: String,

    /// Bearer credential for the completion endpoint
    #[arg(long, global = true, env = "RAGGUARD_API_KEY", default_value = "ollama", hide_env_values = true)]
    api_key: String,

    /// Model identifier used for every stage
    #[arg(long, global = true, env = "RAGGUARD_MODEL", default_value = "glm-5:cloud")]
    model: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "RAGGUARD_TIMEOUT_SECS", default_value = "120")]
    timeout_secs: u64,
}

impl EndpointArgs {
    fn to_config(&self) -> CompletionConfig {
        CompletionConfig::new(&self.base_url)
            .with_api_key(&self.api_key)
            .with_model(&self.model)
            .with_timeout_secs(self.timeout_secs)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question over the given documents
    Ask {
        /// The question to answer
        #[arg(short, long)]
        query: String,

        /// A retrieved document (repeatable)
        #[arg(short, long = "doc")]
        docs: Vec<String>,

        /// JSON file holding an array of document strings
        #[arg(long)]
        docs_file: Option<PathBuf>,

        /// Also ask the model to review the merge decision
        #[arg(long)]
        review: bool,

        /// Print every intermediate artifact, not just the final answer
        #[arg(long)]
        report: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Run an embedded retrieval scenario
    Demo {
        /// Which document set to retrieve
        #[arg(short, long, value_enum)]
        scenario: DemoScenario,

        /// Also ask the model to review the merge decision
        #[arg(long)]
        review: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the effective completion configuration (API key redacted)
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DemoScenario {
    Poisoned,
    Clean,
}

impl From<DemoScenario> for Scenario {
    fn from(scenario: DemoScenario) -> Self {
        match scenario {
            DemoScenario::Poisoned => Scenario::Poisoned,
            DemoScenario::Clean => Scenario::Clean,
        }
    }
}

fn arbitration_mode(review: bool) -> ArbitrationMode {
    if review {
        ArbitrationMode::ModelReviewed
    } else {
        ArbitrationMode::Policy
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    ragguard_core::init_tracing(cli.json, level);

    let config = cli.endpoint.to_config();

    match cli.command {
        Commands::Ask {
            query,
            docs,
            docs_file,
            review,
            report,
            format,
        } => {
            let query = Query::new(query).context("Invalid question")?;
            let documents = input::load_documents(&docs, docs_file.as_deref())?;
            cmd_answer(&config, &query, &documents, review, report, format).await
        }
        Commands::Demo {
            scenario,
            review,
            format,
        } => {
            let scenario = Scenario::from(scenario);
            let query = scenario.query().context("Invalid scenario question")?;
            cmd_answer(&config, &query, &scenario.documents(), review, true, format).await
        }
        Commands::Config => cmd_config(&config),
    }
}

async fn cmd_answer(
    config: &CompletionConfig,
    query: &Query,
    documents: &DocumentSet,
    review: bool,
    report: bool,
    format: OutputFormat,
) -> Result<()> {
    debug!(
        base_url = %config.base_url,
        model = %config.model,
        documents = documents.len(),
        "Building pipeline"
    );

    let client =
        OpenAiCompatClient::new(config.clone()).context("Failed to build completion client")?;
    let pipeline = Pipeline::new(
        Arc::new(client),
        PipelineConfig::new(&config.model).with_arbitration(arbitration_mode(review)),
    );

    let run = pipeline
        .run_with_report(query, documents)
        .await
        .context("Pipeline run failed")?;

    match (format, report) {
        (OutputFormat::Json, true) => println!("{}", serde_json::to_string_pretty(&run)?),
        (OutputFormat::Json, false) => println!("{}", serde_json::to_string_pretty(&run.result)?),
        (OutputFormat::Text, true) => print!("{}", output::render_report(&run)),
        (OutputFormat::Text, false) => println!("{}", output::render_result(&run.result)),
    }

    Ok(())
}

fn cmd_config(config: &CompletionConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_collects_repeated_docs_in_order() {
        let cli = Cli::try_parse_from([
            "ragguard", "ask", "--query", "Who?", "--doc", "first", "--doc", "second",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask { query, docs, review, report, .. } => {
                assert_eq!(query, "Who?");
                assert_eq!(docs, vec!["first", "second"]);
                assert!(!review);
                assert!(!report);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_demo_requires_known_scenario() {
        assert!(Cli::try_parse_from(["ragguard", "demo", "--scenario", "bogus"]).is_err());

        let cli = Cli::try_parse_from(["ragguard", "demo", "--scenario", "poisoned", "--review"])
            .unwrap();
        match cli.command {
            Commands::Demo { scenario, review, .. } => {
                assert_eq!(Scenario::from(scenario), Scenario::Poisoned);
                assert_eq!(arbitration_mode(review), ArbitrationMode::ModelReviewed);
            }
            _ => panic!("expected demo"),
        }
    }

    #[test]
    fn test_endpoint_flags_build_config() {
        let cli = Cli::try_parse_from([
            "ragguard",
            "--base-url",
            "http://example.test/v1/",
            "--model",
            "local-model",
            "--timeout-secs",
            "5",
            "config",
        ])
        .unwrap();

        let config = cli.endpoint.to_config();
        assert_eq!(config.base_url, "http://example.test/v1");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.timeout_secs, 5);
    }
}

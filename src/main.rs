use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::Level;

use quizgen::config::{Config, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, EnvCredentials, Settings};
use quizgen::llm::OpenAiModel;
use quizgen::pipeline;
use quizgen::prompt::Prompt;

/// Reads a topic from stdin and prints the model's JSON quiz for it.
#[derive(Parser, Debug)]
#[command(name = "quizgen", version, about = "Generate a JSON quiz for a topic read from stdin.", long_about = None)]
struct Cli {
    /// Model identifier sent to the service
    #[arg(long, env = "QUIZGEN_MODEL", default_value = DEFAULT_MODEL)]
    model: String,
    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "QUIZGEN_API_BASE", value_name = "URL")]
    api_base: Option<String>,
    /// Give up on the service after this many seconds
    #[arg(long, env = "QUIZGEN_TIMEOUT_SECS", value_name = "SECS")]
    timeout_secs: Option<u64>,
    /// Upper bound on tokens the model may generate
    #[arg(long, env = "QUIZGEN_MAX_OUTPUT_TOKENS", default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    max_output_tokens: u32,
    /// Print the prompt that would be sent and exit
    #[arg(long, default_value_t = false, conflicts_with = "check_key")]
    print_prompt: bool,
    /// Verify the configured API key against the service and exit
    #[arg(long, default_value_t = false)]
    check_key: bool,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
            max_output_tokens: self.max_output_tokens,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let credentials = EnvCredentials::default();

    if cli.check_key {
        let config = Config::load(&credentials, cli.settings())?;
        let model = OpenAiModel::connect(&config)?;
        model.check_key().await?;
        eprintln!(
            "API key from {} is valid (model: {}).",
            credentials.var(),
            model.model()
        );
        return Ok(());
    }

    let topic = read_topic(io::stdin().lock())?;

    if cli.print_prompt {
        let prompt = Prompt::for_topic(&topic);
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}\n{}", prompt.system, prompt.user)?;
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    pipeline::run(
        &credentials,
        cli.settings(),
        OpenAiModel::connect,
        &topic,
        &mut stdout,
    )
    .await
    .context("Quiz generation failed")?;

    Ok(())
}

fn read_topic(mut input: impl Read) -> Result<String> {
    let mut raw = String::new();
    input
        .read_to_string(&mut raw)
        .context("Failed to read topic from stdin")?;
    Ok(raw.trim().to_string())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

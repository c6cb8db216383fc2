use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use shopping_agent::agent::{FailureMode, SummaryMode};
use shopping_agent::config::{AgentConfig, LogFormat, LoggingConfig};
use shopping_agent::intent::{CannedExtractor, ExtractorKind};
use shopping_agent::{QueryResponse, ShoppingAgent};

/// Sample questions covering each tool.
const SAMPLE_QUERIES: &[&str] = &[
    "Find me a red skirt under $40",
    "Compare prices for Blue Jacket",
    "What's the shipping cost to New York?",
    "Check discount with code SAVE10 on a $100 order",
    "What's the return policy for StoreA?",
];

#[derive(Debug, Parser)]
#[command(
    name = "shopping-agent",
    about = "Answer shopping questions with catalog tools",
    after_help = "Examples:\n  shopping-agent ask \"Find me a red skirt under $40\"\n  shopping-agent --extractor canned examples\n  shopping-agent --json ask \"What's the return policy for StoreA?\""
)]
struct Cli {
    /// Intent extraction strategy (overrides SHOPPING_AGENT_EXTRACTOR)
    #[arg(long, global = true, value_enum)]
    extractor: Option<ExtractorKind>,

    /// Keep running the remaining steps when one fails
    #[arg(long, global = true)]
    partial: bool,

    /// How step sentences are combined (overrides SHOPPING_AGENT_SUMMARY)
    #[arg(long, global = true, value_enum)]
    summary: Option<SummaryMode>,

    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer one or more queries
    Ask {
        #[arg(required = true)]
        queries: Vec<String>,
    },
    /// List the registered tools
    Tools,
    /// Run the built-in example queries
    Examples,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AgentConfig::from_env().context("loading configuration")?;
    if let Some(kind) = cli.extractor {
        config.extractor = kind;
    }
    if cli.partial {
        config.failure_mode = FailureMode::Partial;
    }
    if let Some(mode) = cli.summary {
        config.summary = mode;
    }
    config.validate().context("validating configuration")?;

    init_logging(&config.logging);

    let agent = ShoppingAgent::from_config(&config).context("building agent")?;

    match cli.command {
        Command::Ask { queries } => Ok(answer_all(&agent, &queries, cli.json)),
        Command::Examples => {
            let queries: Vec<String> = match agent.extractor_kind() {
                ExtractorKind::Canned => CannedExtractor::new()
                    .example_queries()
                    .into_iter()
                    .map(String::from)
                    .collect(),
                _ => SAMPLE_QUERIES.iter().map(|q| q.to_string()).collect(),
            };
            Ok(answer_all(&agent, &queries, cli.json))
        }
        Command::Tools => {
            let specs = agent.registry().list_all();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&specs)?);
            } else {
                for spec in specs {
                    println!(
                        "{} ({})\n    {}",
                        spec.name.bold(),
                        spec.parameter_names.join(", "),
                        spec.description
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn answer_all(agent: &ShoppingAgent, queries: &[String], json: bool) -> ExitCode {
    let mut all_ok = true;

    for query in queries {
        let response = agent.process_query(query);
        all_ok &= response.is_success();

        if json {
            match serde_json::to_string_pretty(&response) {
                Ok(text) => println!("{text}"),
                Err(err) => {
                    eprintln!("{} could not serialize response: {err}", "error:".red().bold());
                    all_ok = false;
                }
            }
        } else {
            print_response(&response);
        }
    }

    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_response(response: &QueryResponse) {
    println!("{} {}", "?".cyan().bold(), response.query.bold());

    if !response.is_success() {
        let message = response.message.as_deref().unwrap_or("unknown error");
        println!("  {} {}\n", "✘".red().bold(), message.red());
        return;
    }

    for (i, step) in response.steps.iter().enumerate() {
        let params = serde_json::Value::Object(step.parameters.clone());
        println!("  {}. {} {}", i + 1, step.tool.yellow(), params.to_string().dimmed());
        match &step.error {
            Some(error) => println!("     {} {}", "✘".red(), error),
            None => println!("     {}", step.result.to_string().dimmed()),
        }
    }

    if let Some(answer) = &response.natural_response {
        println!("  {} {}", "✔".green().bold(), answer);
    }
    println!();
}

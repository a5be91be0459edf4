use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nlq::keywords::Lexicon;
use nlq::output;
use nlq::query::NlParser;
use nlq::utils::{get_config_path, AppConfig, OperatorSuggester};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nlq")]
#[command(about = "Parse natural-language search requests into structured intents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print JSON instead of the colored tree
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of the one in the app data directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log parser decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query into an intent
    Parse {
        /// Query text; several words are joined with spaces
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Show the token stream for a query
    Tokens {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Suggest operator words close to a misspelled one
    Suggest {
        word: String,

        /// Max suggestions (defaults to the configured value)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Show the effective configuration
    Config {
        /// Write the default configuration if no file exists yet
        #[arg(long)]
        init: bool,
    },
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "nlq=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NLQ_LOG").unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => get_config_path()?,
    };
    let config = AppConfig::load_from(&config_path)?;
    debug!(path = %config_path.display(), "loaded config");

    let color = std::io::stdout().is_terminal();
    let tables = config.lexicon();
    let lexicon: &dyn Lexicon = &*tables;

    match cli.command {
        Commands::Parse { text } => {
            let text = text.join(" ");
            let parser = NlParser::new(lexicon);
            match parser.parse(&text) {
                Ok(intent) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&intent)?);
                    } else {
                        output::print_intent(&intent, color)?;
                    }
                }
                Err(err) => {
                    if !cli.json {
                        suggest_for_failure(&parser, &text, &config, color)?;
                    }
                    return Err(err.into());
                }
            }
        }
        Commands::Tokens { text } => {
            let tokens = NlParser::new(lexicon).tokenize(&text.join(" "));
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&tokens)?);
            } else {
                output::print_tokens(&tokens, color)?;
            }
        }
        Commands::Suggest { word, count } => {
            let suggestions = OperatorSuggester::new(lexicon)
                .with_threshold(config.suggestion_threshold)
                .suggest(&word, count.unwrap_or(config.max_suggestions));
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else {
                output::print_suggestions(&word, &suggestions, color)?;
            }
        }
        Commands::Config { init } => {
            if init && !config_path.exists() {
                config.save_to(&config_path)?;
                eprintln!("Wrote default config to {}", config_path.display());
            }
            if !cli.json {
                println!("# {}", config_path.display());
            }
            let content =
                serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("{}", content);
        }
    }

    Ok(())
}

/// After a failed parse, offer operator words close to each unrecognized
/// word of the input.
fn suggest_for_failure(parser: &NlParser<'_>, text: &str, config: &AppConfig, color: bool) -> Result<()> {
    let suggester =
        OperatorSuggester::new(parser.lexicon()).with_threshold(config.suggestion_threshold);
    for token in parser.tokenize(text).iter().filter(|t| t.is_unknown()) {
        let suggestions = suggester.suggest(&token.text, config.max_suggestions);
        if !suggestions.is_empty() {
            output::print_suggestions(&token.text, &suggestions, color)?;
        }
    }
    Ok(())
}

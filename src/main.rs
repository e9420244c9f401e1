use anyhow::Result;
use clap::{Parser, Subcommand};
use stockwatch::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for stockwatch::AppCommand {
    fn from(cmd: Commands) -> stockwatch::AppCommand {
        match cmd {
            Commands::Record => stockwatch::AppCommand::Record,
            Commands::Serve => stockwatch::AppCommand::Serve,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record one price snapshot and exit
    Record,
    /// Serve the HTTP API without recording
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => stockwatch::run_command(cmd.into(), cli.config_path.as_deref()).await,
        // Default mirrors a plain process start: record once, then serve.
        None => {
            stockwatch::run_command(
                stockwatch::AppCommand::RecordAndServe,
                cli.config_path.as_deref(),
            )
            .await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = stockwatch::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
symbol: "msft"
currencies: ["eur", "dkk"]

providers:
  quote:
    base_url: "https://api.aletheiaapi.com"
  rates:
    base_url: "https://cdn.jsdelivr.net/gh/fawazahmed0/currency-api@1"

# Quote provider key; the STOCKWATCH_API_KEY environment variable wins.
api_key: null

port: 3000
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}

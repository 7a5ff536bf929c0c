mod commands;

use anyhow::Context;
use cfzone_core::{Action, Overrides};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "cfzone")]
#[command(version, about = "Purge cache and change zone settings on Cloudflare", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Cloudflare account email (falls back to CF_EMAIL)
    #[arg(long)]
    email: Option<String>,

    /// Cloudflare API key (falls back to CF_KEY)
    #[arg(long)]
    key: Option<String>,

    /// Zone domain name (falls back to CF_DOMAIN)
    #[arg(long)]
    zone: Option<String>,

    /// Purge everything cached for the zone
    #[arg(long)]
    purge_cache: bool,

    /// Enable or disable development mode: on/off
    #[arg(long, value_name = "on|off")]
    development_mode: Option<String>,

    /// Change security level: attack/high/medium/low
    #[arg(long, value_name = "LEVEL")]
    secure_level: Option<String>,

    /// API base URL (falls back to CF_API_URL)
    #[arg(long, hide = true)]
    api_url: Option<String>,

    /// Config file [default: ~/.cfzone/config.toml]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    if let Some(Command::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "cfzone", &mut io::stdout());
        return Ok(());
    }

    let (action, ignored) = Action::select(
        cli.purge_cache,
        cli.secure_level.as_deref(),
        cli.development_mode.as_deref(),
    );

    let Some(action) = action else {
        println!("No actions specified. Available options:");
        Cli::command().print_help()?;
        return Ok(());
    };

    for flag in ignored {
        tracing::warn!("Ignoring --{}: only one action runs per invocation", flag);
    }

    let overrides = Overrides {
        email: cli.email,
        key: cli.key,
        zone: cli.zone,
        api_url: cli.api_url,
    };

    commands::zone::run(action, overrides, cli.config).await
}

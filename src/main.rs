//! summeval - Dialogue summarization evaluation across model variants
//!
//! Entry point for the summeval CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use summeval::cli::commands;
use summeval::cli::{Cli, Commands};
use summeval::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        summeval::cli::completions::print(shell);
        return Ok(());
    }

    // Load configuration only for runtime commands.
    let settings = Settings::load()?;

    // Initialize logging
    let default_level = if cli.verbose {
        "debug"
    } else {
        settings.general.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Generate { generation, output } => {
            commands::generate_summaries(&settings, &generation, &output).await?;
        }
        Commands::Score { input, scoring } => {
            commands::score_results(&settings, &input, &scoring)?;
        }
        Commands::Compare {
            input,
            a,
            b,
            stemmer,
            json,
        } => {
            commands::compare_results(&settings, &input, a, b, stemmer, json)?;
        }
        Commands::Evaluate {
            generation,
            output,
            scoring,
        } => {
            commands::evaluate(&settings, &generation, output, &scoring).await?;
        }
        Commands::Prompt { file } => {
            commands::print_prompt(file)?;
        }
        Commands::History { limit } => {
            commands::list_runs(&settings, limit)?;
        }
        Commands::View { id } => {
            commands::view_run(&settings, &id)?;
        }
        Commands::Delete { id } => {
            commands::delete_run(&settings, &id)?;
        }
        Commands::Config(config_cmd) => {
            commands::config_command(&settings, config_cmd)?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}

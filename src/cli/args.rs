//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::dataset::Split;
use crate::generation::ModelVariant;

/// summeval - Compare base, fine-tuned and LoRA-tuned dialogue summaries with ROUGE
#[derive(Parser, Debug)]
#[command(name = "summeval")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate summaries with each model variant and write the results table
    Generate {
        #[command(flatten)]
        generation: GenerateArgs,

        /// Results table to write
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,
    },

    /// Score every model column of a results table against the human summaries
    Score {
        /// Results table (CSV)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        scoring: ScoreArgs,
    },

    /// Show the percentage-point difference between two model columns
    Compare {
        /// Results table (CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Variant being measured
        #[arg(long, default_value = "adapter")]
        a: ModelVariant,

        /// Variant it is measured against
        #[arg(long, default_value = "base")]
        b: ModelVariant,

        /// Porter-stem tokens before matching
        #[arg(long)]
        stemmer: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate, score and compare in one run
    Evaluate {
        #[command(flatten)]
        generation: GenerateArgs,

        /// Also write the results table here
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        scoring: ScoreArgs,
    },

    /// Print the summarization prompt for a dialogue
    Prompt {
        /// File holding the dialogue (defaults to stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List stored evaluation runs
    History {
        /// Maximum number of runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show a stored evaluation run
    View {
        /// Run ID or partial ID
        id: String,
    },

    /// Delete a stored evaluation run
    Delete {
        /// Run ID or partial ID
        id: String,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Dataset selection and decoding overrides
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Dataset directory (defaults to [dataset].path)
    #[arg(short, long)]
    pub dataset: Option<PathBuf>,

    /// Split to evaluate on (train, validation, test)
    #[arg(long)]
    pub split: Option<Split>,

    /// Only use the first N dialogues
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Model variant to run (repeatable, defaults to all three)
    #[arg(long = "variant", value_name = "VARIANT")]
    pub variants: Vec<ModelVariant>,

    /// Override a generation option (e.g. --set num_beams=4)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,
}

/// Scoring and reporting flags
#[derive(Args, Debug, Clone, Default)]
pub struct ScoreArgs {
    /// Porter-stem tokens before matching
    #[arg(long)]
    pub stemmer: bool,

    /// Also report scores for every dialogue
    #[arg(long)]
    pub per_example: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Do not record the run in the history database
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

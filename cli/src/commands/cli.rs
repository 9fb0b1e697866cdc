use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "launchpad", version, about = "Launchpad gateway server and scoring utilities")]
pub struct Args {
    /// Explicit config file. Without it, ~/.launchpad/config.toml then ./config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Overrides `http_server.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Overrides `http_server.port`.
    #[arg(long)]
    pub port: Option<u16>,

    /// Overrides `http_server.static_dir`.
    #[arg(long)]
    pub static_dir: Option<String>,

    #[arg(long)]
    pub session_id: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ScoreArgs {
    /// Raw matching scores.
    #[arg(required = true, allow_negative_numbers = true)]
    pub scores: Vec<f64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(required = true)]
    pub paths: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AssessArgs {
    /// JSON file with the answer map (`{"q1": 4, ...}`).
    #[arg(long)]
    pub answers: PathBuf,

    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gateway HTTP server.
    Serve(ServeArgs),
    /// Normalize raw matching scores to percentages.
    Score(ScoreArgs),
    /// Show how the access gate classifies request paths.
    Classify(ClassifyArgs),
    /// Submit a guest assessment and print the ranked careers.
    Assess(AssessArgs),
}

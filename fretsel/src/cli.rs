use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "fretsel")]
#[command(about = "Photon alternation and burst selection for smFRET datasets", version)]
pub struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a selection pipeline on a burst dataset.
    Select(SelectArgs),
    /// Split a raw photon stream into excitation and emission categories.
    Alternate(AlternateArgs),
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Dataset JSON (`"mode": "single_excitation"` or `"alternating_excitation"`).
    #[arg(long)]
    pub dataset: PathBuf,

    /// Pipeline JSON: `{"steps": [{"kind": ...}, ...]}`.
    #[arg(long)]
    pub pipeline: PathBuf,

    /// Write the per-step summaries here.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the narrowed dataset here.
    #[arg(long)]
    pub selected: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AlternateArgs {
    /// Raw photons JSON: `{"times": [...], "detectors": [...]}`.
    #[arg(long)]
    pub photons: PathBuf,

    /// Alternation configuration JSON, usALEX defaults when absent.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = 100)]
    pub bins: usize,

    /// Write the classified photons here.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

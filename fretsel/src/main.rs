use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, LevelFilter};

use fretcore::alex::AlternationConfig;
use fretsel::alternate::alternate;
use fretsel::cli::{AlternateArgs, Cli, Commands, SelectArgs};
use fretsel::io::{load_dataset, load_pipeline, read_json, write_json, RawPhotons};
use fretsel::report::summary_table;
use fretsel::run_pipeline;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Select(args) => select(args),
        Commands::Alternate(args) => alternation(args),
    }
}

fn select(args: SelectArgs) -> Result<()> {
    let dataset = load_dataset(&args.dataset)?;
    let pipeline = load_pipeline(&args.pipeline)?;
    let (selected, summaries) = run_pipeline(dataset, &pipeline)
        .with_context(|| format!("pipeline {} failed", args.pipeline.display()))?;

    print!("{}", summary_table(&summaries));

    if let Some(path) = &args.output {
        write_json(path, &summaries)?;
    }
    if let Some(path) = &args.selected {
        write_json(path, &selected)?;
    }
    Ok(())
}

fn alternation(args: AlternateArgs) -> Result<()> {
    let raw: RawPhotons = read_json(&args.photons)?;
    let config: AlternationConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => AlternationConfig::default(),
    };
    let (photons, report) = alternate(raw, &config, args.bins)?;

    println!("raw photons:       {}", report.raw);
    println!("kept photons:      {}", report.kept);
    println!("donor excitation:  {}", report.donor_ex);
    println!("acceptor exc.:     {}", report.acceptor_ex);
    println!("AexAem photons:    {}", report.acceptor_em_acceptor_ex);
    debug!("alternation histogram ({} bins): {:?}", args.bins, report.histogram);

    if let Some(path) = &args.output {
        write_json(path, &photons)?;
    }
    Ok(())
}

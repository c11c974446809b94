use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use crash_analytics::utils::logging::console::{print_answer, print_banner};
use crash_analytics::utils::logging::{create_spinner, finish_and_clear};
use crash_analytics::{AnalysisConfig, AnalysisId, AnalysisOutcome, CrashAnalysis};

/// Answer the crash-data questions over the tables named in a config file
#[derive(Parser, Debug)]
#[command(name = "crash-analytics")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config/config.yaml")]
    config: PathBuf,

    /// Run only this analysis
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
    analysis: Option<u8>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn print_outcome(outcome: &AnalysisOutcome) {
    print_answer(outcome.number, outcome.title, &outcome.answer.to_string());
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = AnalysisConfig::from_yaml_file(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let spinner = create_spinner(Some("Loading crash tables..."));
    let loaded = CrashAnalysis::from_config(&config);
    finish_and_clear(&spinner);
    let analysis = loaded.context("Failed to load crash tables")?;

    let selected = cli.analysis.and_then(AnalysisId::from_number);

    if let Some(id) = selected {
        let outcome = analysis
            .run(id)
            .with_context(|| format!("Analysis {} failed", id.number()))?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            print_banner();
            print_outcome(&outcome);
            print_banner();
        }
        return Ok(());
    }

    let report = analysis.run_all().context("Running analyses failed")?;
    info!("Completed {} analyses", report.analyses.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_banner();
        for outcome in &report.analyses {
            print_outcome(outcome);
        }
        print_banner();
    }

    Ok(())
}

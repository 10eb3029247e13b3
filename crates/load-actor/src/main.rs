//! Load actor CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use load_actor::{PhaseDecl, RunReport, RunSummary, WorkloadConfig, WorkloadRunner};

#[derive(Parser)]
#[command(name = "load-actor")]
#[command(about = "Phase-driven HTTP load generation", long_about = None)]
struct Cli {
    /// Log level for engine traces
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workload from a scenario file
    Run {
        /// Path to scenario YAML file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override the number of actor instances
        #[arg(short, long)]
        actors: Option<u32>,

        /// Output format: table (default), json, csv
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Run a quick single-phase GET smoke test
    Quick {
        /// Base URL
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        /// Route suffix to request
        #[arg(short, long, default_value = "/")]
        route: String,

        /// Requests per actor instance
        #[arg(short = 'n', long, default_value = "100")]
        requests: u64,

        /// Number of actor instances
        #[arg(short, long, default_value = "1")]
        actors: u32,
    },

    /// List available scenarios
    List {
        /// Scenarios directory
        #[arg(short, long, default_value = "scenarios")]
        dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            scenario,
            actors,
            output,
        } => {
            println!("Loading workload: {}", scenario.display());

            let mut config = WorkloadConfig::from_file(&scenario)?;

            // Apply overrides
            if let Some(actors) = actors {
                config.actors = actors;
            }

            config.validate()?;

            println!("✓ Workload loaded successfully");
            println!("  Name: {}", config.name);
            println!("  Description: {}", config.description);
            println!("  Base URL: {}", config.base_url);
            println!("  Actors: {}", config.actors);
            println!("  Phases: {}", config.phases.len());
            println!();

            execute(config, &output)
        }
        Commands::Quick {
            url,
            route,
            requests,
            actors,
        } => {
            println!("Running quick test:");
            println!("  URL: {}{}", url, route);
            println!("  Requests per actor: {}", requests);
            println!("  Actors: {}", actors);
            println!();

            let config = WorkloadConfig {
                name: "quick".to_string(),
                description: "Quick smoke test".to_string(),
                base_url: url,
                actors,
                timeout_secs: 30,
                seed: None,
                phases: vec![PhaseDecl {
                    nop: false,
                    route: Some(route),
                    operation: Some("GET".to_string()),
                    repeat: requests,
                    body: None,
                }],
            };
            config.validate()?;

            execute(config, "table")
        }
        Commands::List { dir } => {
            println!("Available scenarios in {}:", dir.display());
            println!();

            match std::fs::read_dir(&dir) {
                Ok(entries) => {
                    let mut scenarios = Vec::new();

                    for entry in entries.flatten() {
                        let path = entry.path();
                        if path.extension().and_then(|s| s.to_str()) == Some("yaml") {
                            if let Ok(config) = WorkloadConfig::from_file(&path) {
                                scenarios.push((
                                    path.file_name().unwrap().to_string_lossy().to_string(),
                                    config.name,
                                    config.description,
                                ));
                            }
                        }
                    }

                    scenarios.sort_by(|a, b| a.0.cmp(&b.0));

                    if scenarios.is_empty() {
                        println!("No scenario files found");
                    } else {
                        for (filename, name, desc) in scenarios {
                            println!("  {} - {}", filename, name);
                            println!("    {}", desc);
                            println!();
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Error reading directory: {}", e);
                    eprintln!("Make sure the directory exists and is readable");
                }
            }

            Ok(())
        }
    }
}

/// Run a validated workload and print its report.
///
/// Every completed iteration stays counted even when instances abort, so
/// the aggregate report is printed before failures are surfaced.
fn execute(config: WorkloadConfig, output: &str) -> anyhow::Result<()> {
    let name = config.name.clone();
    let actors = config.actors;

    let runner = WorkloadRunner::new(config);
    let outcome = runner.run()?;

    let summary = RunSummary::new(&name, actors, outcome.totals);
    match output {
        "json" => {
            println!("{}", RunReport::format_json(&summary)?);
        }
        "csv" => {
            println!("{}", RunReport::csv_header());
            println!("{}", RunReport::format_csv(&summary));
        }
        _ => {
            println!("{}", RunReport::format_table(&summary));
        }
    }

    if outcome.failures.is_empty() {
        Ok(())
    } else {
        for failure in &outcome.failures {
            eprintln!("actor-{} aborted: {}", failure.instance, failure.error);
        }
        anyhow::bail!(
            "{} actor instance(s) aborted on transport failure",
            outcome.failures.len()
        )
    }
}

//! Kinetic CLI
//!
//! Run page choreographies headlessly, sample easing curves, and manage
//! configuration files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kinetic_animation::Easing;
use kinetic_choreo::{ChoreoConfig, PageKind};

mod simulate;

use simulate::Simulation;

const DEFAULT_CONFIG_FILE: &str = "kinetic.toml";

#[derive(Parser)]
#[command(name = "kinetic")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kinetic choreography CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount a page on a headless surface and advance it frame by frame
    Simulate {
        /// Page to mount (home, about, work, services)
        #[arg(short, long, default_value = "home")]
        page: PageKind,

        /// Viewport width
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Viewport height
        #[arg(long, default_value = "800")]
        height: f32,

        /// Seconds to simulate
        #[arg(short, long, default_value = "5")]
        duration: f32,

        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Scroll the document to this offset once the first half has run
        #[arg(long)]
        scroll_to: Option<f32>,

        /// Config file (defaults to $KINETIC_CONFIG, then built-in defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Include every element's final style in the report
        #[arg(long)]
        snapshot: bool,
    },

    /// Sample an easing curve, e.g. "power3.out" or "back.out(1.7)"
    Ease {
        name: String,

        /// Number of samples between 0 and 1 inclusive
        #[arg(short, long, default_value = "11")]
        samples: usize,
    },

    /// Inspect or create configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Parse and validate a config file
    Check {
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },

    /// Write a config file holding every default
    Init {
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            page,
            width,
            height,
            duration,
            fps,
            scroll_to,
            config,
            snapshot,
        } => cmd_simulate(
            Simulation {
                page,
                width,
                height,
                duration,
                fps,
                scroll_to,
                snapshot,
            },
            config.as_deref(),
        ),

        Commands::Ease { name, samples } => cmd_ease(&name, samples),

        Commands::Config { command } => match command {
            ConfigCommands::Check { path } => cmd_config_check(&path),
            ConfigCommands::Init { path, force } => cmd_config_init(&path, force),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<ChoreoConfig> {
    match path {
        Some(path) => ChoreoConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => ChoreoConfig::load_or_default().context("Failed to load config"),
    }
}

fn cmd_simulate(simulation: Simulation, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    info!(
        "Simulating {} at {}x{} for {}s",
        simulation.page, simulation.width, simulation.height, simulation.duration
    );

    let report = simulation.run(config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[derive(serde::Serialize)]
struct EaseSample {
    t: f32,
    value: f32,
}

fn cmd_ease(name: &str, samples: usize) -> Result<()> {
    let easing: Easing = name
        .parse()
        .with_context(|| format!("Unknown easing '{}'", name))?;
    if samples < 2 {
        anyhow::bail!("Need at least 2 samples, got {}", samples);
    }
    debug!("Sampling {} at {} points", easing, samples);

    let points: Vec<EaseSample> = (0..samples)
        .map(|i| {
            let t = i as f32 / (samples - 1) as f32;
            EaseSample {
                t,
                value: easing.apply(t),
            }
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}

fn cmd_config_check(path: &Path) -> Result<()> {
    let config = ChoreoConfig::load(path)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    info!("{} is valid", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }
    let content = ChoreoConfig::default().to_toml()?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "kinetic", "simulate", "--page", "work", "--width", "500", "--scroll-to", "900",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate {
                page,
                width,
                scroll_to,
                fps,
                ..
            } => {
                assert_eq!(page, PageKind::Work);
                assert_eq!(width, 500.0);
                assert_eq!(scroll_to, Some(900.0));
                assert_eq!(fps, 60);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_rejects_unknown_page() {
        assert!(Cli::try_parse_from(["kinetic", "simulate", "--page", "contact"]).is_err());
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["kinetic", "-v", "config", "init", "--force"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Init { path, force },
            } => {
                assert_eq!(path, PathBuf::from(DEFAULT_CONFIG_FILE));
                assert!(force);
            }
            _ => panic!("expected config init"),
        }
    }
}

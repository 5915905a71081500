//! cep-weather
//!
//! Resolves a Brazilian postal code (CEP) to the city's current temperature.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────┐   traceparent    ┌──────────────┐
//!  GET ?cep=..    │  Front unit  │ ───────────────▶ │  Back unit   │
//! ──────────────▶ │ validate cep │                  │   resolver   │
//!                 │ relay result │ ◀─────────────── │              │
//!                 └──────────────┘   JSON / 404     └──────┬───────┘
//!                                                          │ traceparent
//!                                       ┌──────────────────┴─────────────┐
//!                                       ▼                                ▼
//!                              postal directory                   weather API
//!                              (cep → locality)               (locality → °C)
//! ```
//!
//! Both units run from this binary: `cep-weather front` or `cep-weather back`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cep_weather::config::{resolve_config, Unit};
use cep_weather::lifecycle;

#[derive(Parser)]
#[command(name = "cep-weather")]
#[command(about = "Postal code to temperature service", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long, global = true)]
    bind: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate postal codes and relay them to the back unit
    Front,
    /// Resolve postal codes via the directory and weather services
    Back,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let unit = match cli.command {
        Commands::Front => Unit::Front,
        Commands::Back => Unit::Back,
    };

    let mut config = resolve_config(cli.config.as_deref(), unit)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = Some(bind);
    }

    lifecycle::run(unit, config).await?;
    Ok(())
}

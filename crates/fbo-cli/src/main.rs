//! fbo - plan and analyse an OnAir FBO network from the command line.

mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use fbo_core::AirportType;
use fbo_store::AirportEdit;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "fbo", author, version, about = "Plan and analyse an FBO network")]
pub struct Cli {
    /// Print machine-readable JSON instead of text reports
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List airports hosting an FBO
    List,
    /// Show spacing metrics for the current network
    Metrics,
    /// Show pairwise distances and proximity clusters
    Distances,
    /// Rank airports where a new FBO would improve the network
    Optimal,
    /// Propose FBOs that could be closed with little loss
    Redundant,
    /// Open an FBO at an airport, fetching the airport from OnAir if it is not stored
    Add {
        icao: String,
        /// Country code to use when OnAir has none for the airport
        #[arg(long)]
        country_code: Option<String>,
        /// Airport type: AD or ALA
        #[arg(long)]
        airport_type: Option<AirportType>,
    },
    /// Show or edit an airport's location details and type
    Modify {
        icao: String,
        #[command(flatten)]
        fields: AirportFields,
    },
    /// Close the FBO at an airport
    Remove { icao: String },
    /// Search stored airports by ICAO or name
    Search { text: String },
    /// Fetch an airport from OnAir and store it
    Import { icao: String },
    /// Mirror the company's FBO list from OnAir
    Sync,
}

/// Airport fields editable from the command line. An empty value clears
/// state, country name or city.
#[derive(Args, Debug, Default)]
pub struct AirportFields {
    #[arg(long)]
    pub country_code: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub country_name: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    /// AD or ALA
    #[arg(long)]
    pub airport_type: Option<AirportType>,
}

impl From<AirportFields> for AirportEdit {
    fn from(fields: AirportFields) -> Self {
        AirportEdit {
            country_code: fields.country_code,
            state: fields.state,
            country_name: fields.country_name,
            city: fields.city,
            airport_type: fields.airport_type,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout stay clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("fbo=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    commands::run(cli, &config).await
}

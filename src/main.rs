//! # Tide Chart Application Entry Point
//!
//! Loads configuration, fetches predictions for one station and prints the
//! chart to the terminal. Failures are reported as a short message list and a
//! non-zero exit status; no partial chart is printed.

use chrono::{Local, Utc};
use clap::Parser;
use std::path::PathBuf;
use tide_chart_lib::{
    chart::ChartController,
    config::{Config, CONFIG_FILE},
    renderer::TextSink,
    station_client::StationClient,
    transport::ReqwestTransport,
};

/// Bar chart of the next 24 hours of NOAA tide predictions
#[derive(Parser, Debug)]
#[command(name = "tide-chart")]
#[command(version)]
struct Cli {
    /// NOAA station code, overriding the config file
    #[arg(long, short)]
    station: Option<String>,

    /// Path to the TOML configuration file
    #[arg(long, short, default_value = CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load_from_path(&cli.config).with_station_override(cli.station);

    let transport = ReqwestTransport::new(config.api.timeout())?;
    let client = StationClient::new(transport, config.api.clone());
    let controller = ChartController::new(client, &config.chart);

    let mut sink = TextSink::new(config.chart.columns, config.chart.rows);
    match controller.run(&config.station.id, Utc::now(), &Local, &mut sink) {
        Ok(report) => {
            log::info!(
                "Charted {} bars for {} ({} skipped)",
                report.layout.bars.len(),
                report.station.name,
                report.layout.skipped.len()
            );
            print!("{}", sink.render());
            Ok(())
        }
        Err(failure) => {
            eprintln!("Messages:");
            for message in &failure.messages {
                eprintln!("  {}", message);
            }
            Err(failure.into())
        }
    }
}

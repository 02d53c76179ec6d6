// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Beacon: measures the per-tick size of a serialized world state and reports
//! rolling packet metrics.

mod world;

use anyhow::Result;
use beacon_control::{ServiceConfig, TelemetryService};
use beacon_io::{ConfigStore, LoadOutcome, Lz4Encoder};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use world::SyntheticWorld;

#[derive(Debug, Parser)]
#[command(name = "beacon", version, about)]
struct Cli {
    /// Settings file. Defaults to `<exe dir>/config/beacon/settings.json`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds. Without it, runs until stdin is closed or
    /// a line is entered.
    #[arg(long, value_name = "SECONDS")]
    run_for: Option<u64>,

    /// Number of players in the synthetic world.
    #[arg(long, default_value_t = 16)]
    players: u32,

    /// Seconds between two packet metrics reports.
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    report_interval: u64,
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = Arc::new(match &cli.config {
        Some(path) => ConfigStore::open(path),
        None => ConfigStore::open_default(),
    });
    if config.load(true) == LoadOutcome::Missing {
        log::info!(
            "Writing default settings to {}",
            config.location().display()
        );
        if let Err(e) = config.save() {
            log::warn!("Running with built-in defaults: {e}");
        }
    }

    let settings = ServiceConfig {
        report_interval: Duration::from_secs(cli.report_interval.max(1)),
        ..ServiceConfig::default()
    };
    let mut service = TelemetryService::new(
        settings,
        config,
        Box::new(SyntheticWorld::new(cli.players)),
        Arc::new(Lz4Encoder),
    );
    service.start()?;

    match cli.run_for {
        Some(seconds) => std::thread::sleep(Duration::from_secs(seconds)),
        None => {
            log::info!("Press Enter to stop");
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
        }
    }

    service.stop();
    service.metrics().report().log();
    Ok(())
}

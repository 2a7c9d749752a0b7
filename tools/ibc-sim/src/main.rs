//! IBC-Sim: Interchain Handshake Simulator
//!
//! Builds two clients, opens a connection and a channel, drives packets
//! through their lifecycle from concurrent workers, and prints the final
//! metrics as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use ibc_core::{IbcConfigFile, IbcError};
use ibc_sim::{run_scenario, ScenarioOptions};
use ibc_telemetry::{init_telemetry, TelemetryConfig};

/// IBC-Sim: Interchain Handshake Simulator
#[derive(Parser, Debug)]
#[command(name = "ibc-sim")]
#[command(about = "Drive clients, connections, channels and packets end to end")]
struct Args {
    /// TOML protocol configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Packets to send
    #[arg(short, long, default_value = "8")]
    packets: usize,

    /// Concurrent packet workers
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Payload of every packet
    #[arg(long, default_value = "hello")]
    payload: String,

    /// Packet deadline relative to send time (e.g. "30s", "1h")
    #[arg(long, default_value = "1h", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let telemetry = TelemetryConfig::from_env().with_json_logs(args.json_logs);
    let _guard = match init_telemetry(telemetry) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    match run(args).await {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast_ref::<IbcError>() {
                Some(ibc) => {
                    let entity = ibc.entity_id().unwrap_or("-");
                    error!(kind = ibc.kind(), entity_id = entity, "Scenario failed");
                    eprintln!("error[{}] {}: {}", ibc.kind(), entity, ibc);
                }
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<String> {
    let config = match &args.config {
        Some(path) => IbcConfigFile::load(path).map_err(IbcError::from)?,
        None => IbcConfigFile::default(),
    };

    let options = ScenarioOptions {
        packets: args.packets,
        workers: args.workers,
        payload: args.payload.into_bytes(),
        timeout: args.timeout,
    };

    let report = run_scenario(&config, &options).await?;
    serde_json::to_string_pretty(&report).context("failed to encode report")
}

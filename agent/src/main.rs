mod antenna;
mod cli;
mod config;
mod error;
mod location;
mod processor;
mod reporter;
mod sink;
mod store;
mod supervisor;

use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use bt_types::SnifferMode;

use antenna::AntennaHandle;
use cli::Args;
use config::{LocationTunables, NetworkConfig, SinkTunables, StoreTunables};
use error::AgentError;
use location::{CancelToken, FixedLocation, LocationReporter};
use processor::{create_pipe, Processor};
use reporter::Reporter;
use sink::HttpSink;
use store::FingerprintStore;
use supervisor::CaptureSupervisor;

/// Capture tool argv for each mode. The specific tools (`ubertooth-rx`,
/// `ubertooth-btle`) are opaque per SPEC_FULL.md §1 — this only needs their
/// names to spawn and to check they're on PATH.
fn capture_argv(mode: SnifferMode, pipe_path: &std::path::Path) -> Vec<String> {
    let pipe = pipe_path.display().to_string();
    match mode {
        SnifferMode::Btbr => vec!["ubertooth-rx".into(), "-l".into(), pipe],
        SnifferMode::Btle => vec!["ubertooth-btle".into(), "-p".into(), pipe],
        SnifferMode::BtleAdv => vec!["ubertooth-btle".into(), "-a".into(), "-p".into(), pipe],
    }
}

fn binary_on_path(name: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir| dir.join(name).is_file())
        })
        .unwrap_or(false)
}

fn hardware_mac() -> String {
    std::env::var("BT_HARDWARE_MAC").unwrap_or_else(|_| "00:00:00:00:00:00".to_string())
}

fn run() -> Result<(), AgentError> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bt_agent=info".into()),
        )
        .init();

    let modes = args
        .parsed_modes()
        .map_err(AgentError::Invariant)?;

    let missing: Vec<&str> = modes
        .iter()
        .map(|m| match m {
            SnifferMode::Btbr => "ubertooth-rx",
            SnifferMode::Btle | SnifferMode::BtleAdv => "ubertooth-btle",
        })
        .filter(|bin| !binary_on_path(bin))
        .collect();
    if !missing.is_empty() {
        return Err(AgentError::Resource(format!(
            "required capture tool(s) not found on PATH: {}",
            missing.join(", ")
        )));
    }

    let network = NetworkConfig::load(&args.config)?;
    info!("loaded network.conf: {}", network.base_url());

    let sink = HttpSink::new(network.base_url(), SinkTunables::default());
    {
        let sink = sink.clone();
        std::thread::spawn(move || sink.run());
    }

    let antenna = Arc::new(AntennaHandle::new());
    {
        let antenna = antenna.clone();
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(SinkTunables::default().tls_insecure)
            .build()
            .expect("reqwest client builds with static config");
        let base_url = network.base_url();
        let mac = hardware_mac();
        std::thread::spawn(move || loop {
            match antenna.bootstrap(&client, &base_url, &mac) {
                Ok(_) => break,
                Err(e) => {
                    error!("antenna bootstrap failed, retrying in 5s: {e}");
                    std::thread::sleep(Duration::from_secs(5));
                }
            }
        });
    }

    let antenna_id = antenna.wait();

    let running = Arc::new(AtomicBool::new(true));
    let mut join_handles = Vec::new();

    for mode in modes {
        let pipe_path = create_pipe(&args.pipes_dir, mode)
            .map_err(|e| AgentError::Resource(format!("creating pipe for {mode}: {e}")))?;

        let supervisor = Arc::new(CaptureSupervisor::new(capture_argv(mode, &pipe_path)));
        {
            let supervisor = supervisor.clone();
            join_handles.push(std::thread::spawn(move || supervisor.run()));
        }

        let store = Arc::new(FingerprintStore::new(mode, StoreTunables::default()));
        let processor = Processor::new(mode, pipe_path, store.clone(), antenna_id, running.clone());
        join_handles.push(std::thread::spawn(move || {
            if let Err(e) = processor.run() {
                error!("processor for {mode} exited: {e}");
            }
        }));

        let reporter = Reporter::new(store, sink.clone(), Duration::from_secs(5));
        join_handles.push(std::thread::spawn(move || reporter.run()));
    }

    let location_tunables = LocationTunables::default();
    let cancel = CancelToken::new();
    {
        let sink = sink.clone();
        let cancel = cancel.clone();
        std::thread::spawn(move || {
            let mut reporter = LocationReporter::new(
                Box::new(FixedLocation { lat: 0.0, lng: 0.0 }),
                sink,
                antenna_id,
                Duration::from_secs(location_tunables.interval_secs),
                cancel,
            );
            reporter.run();
        });
    }

    for handle in join_handles {
        let _ = handle.join();
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // §7: only ConfigError and ResourceError are meant to reach this
            // point in normal operation, but any other error bubbling up here
            // is also fatal — it means a recoverable path failed to recover.
            eprintln!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

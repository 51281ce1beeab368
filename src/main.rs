use clap::Parser;
use log::{error, info};
use ryobi_gdo_bridge::config::{Config, load_dotenv};
use ryobi_gdo_bridge::input::{JsonFileSource, SimulatedOpener};
use ryobi_gdo_bridge::{
    BinarySensorEntity, Coordinator, SensorRegistry, SnapshotSource, setup_entry,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "ryobi-gdo-bridge")]
#[command(about = "Poll a Ryobi garage door opener and report its binary sensors")]
struct Cli {
    /// Opener device id (overrides RYOBI_DEVICE_ID)
    #[arg(long)]
    device_id: Option<String>,

    /// Seconds between coordinator refreshes (overrides RYOBI_POLL_INTERVAL_SECS)
    #[arg(long)]
    poll_interval: Option<u64>,

    /// JSON status file to poll instead of the simulated opener
    #[arg(long)]
    snapshot_file: Option<PathBuf>,

    /// Make the simulated opener fail every N-th fetch
    #[arg(long, env = "RYOBI_SIM_FAIL_EVERY", default_value_t = 0)]
    sim_fail_every: u32,

    /// Seconds between sensor state reports
    #[arg(long, env = "RYOBI_REPORT_INTERVAL_SECS", default_value_t = 10)]
    report_interval: u64,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn load_config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(device_id) = &cli.device_id {
        config.device.device_id = device_id.clone();
    }
    if let Some(interval) = cli.poll_interval {
        config.polling.interval_secs = interval;
    }
    if let Some(path) = &cli.snapshot_file {
        config.input.snapshot_file = Some(path.clone());
    }
    config
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_logger();
    let cli = Cli::parse();
    info!("Starting Ryobi GDO bridge");

    let config = load_config(&cli);
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    info!("Configuration loaded:");
    info!("  Device ID: {}", config.device.device_id);
    info!("  Poll interval: {}s", config.polling.interval_secs);

    let source: Arc<dyn SnapshotSource> = match &config.input.snapshot_file {
        Some(path) => {
            info!("  Input: JSON file {}", path.display());
            Arc::new(JsonFileSource::new(path))
        }
        None => {
            info!("  Input: simulated opener");
            Arc::new(SimulatedOpener::new().with_failures_every(cli.sim_fail_every))
        }
    };

    let coordinator = Arc::new(Coordinator::new(config.device.device_id.clone(), source));
    info!("Coordinator {} created", coordinator.name());

    let mut sensors: Vec<Arc<dyn BinarySensorEntity>> = Vec::new();
    if let Err(e) = setup_entry(
        &config.to_entry(),
        coordinator.clone(),
        &SensorRegistry::builtin(),
        &mut sensors,
    ) {
        error!("Failed to set up binary sensors: {}", e);
        std::process::exit(1);
    }

    let cancel = CancellationToken::new();
    let polling = coordinator
        .clone()
        .spawn_polling(config.poll_interval(), cancel.clone());

    let report_cancel = cancel.clone();
    let report_period = Duration::from_secs(cli.report_interval.max(1));
    let report_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(report_period);
        loop {
            tokio::select! {
                _ = report_cancel.cancelled() => break,
                _ = interval.tick() => {
                    for sensor in &sensors {
                        info!("{} ({}): {}", sensor.name(), sensor.icon(), sensor.state());
                    }
                }
            }
        }
    });

    info!("Ryobi GDO bridge is running");
    info!("  - Press Ctrl+C to exit");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    cancel.cancel();
    if let Err(e) = polling.await {
        error!("Polling task ended abnormally: {}", e);
    }
    if let Err(e) = report_task.await {
        error!("Report task ended abnormally: {}", e);
    }

    info!("Ryobi GDO bridge stopped");
}

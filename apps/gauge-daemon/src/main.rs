use anyhow::{Context, Result};
use clap::Parser;
use hmi_link::{FrameAccumulator, HmiPort, OutgoingFrame, ProtocolHandler};
use hub_client::{HubClient, MockHub, PortReading};
use measure_engine::MeasurementResult;
use station_config::{ConfigStore, CHANNEL_COUNT};
use std::path::PathBuf;
use std::sync::{mpsc, Arc, RwLock};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "gauge-daemon")]
#[command(about = "8-channel gauge station daemon")]
struct Args {
    /// Station configuration file
    #[arg(long, env = "STATION_CONFIG", default_value = "config/station.json")]
    config: PathBuf,

    /// Use the mock hub instead of a live sensor hub
    #[arg(long, env = "MOCK_HUB")]
    mock: bool,

    /// Override the HMI serial device from the configuration
    #[arg(long, env = "HMI_SERIAL_PORT")]
    hmi_port: Option<String>,

    /// Override the HMI baud rate
    #[arg(long, env = "HMI_BAUD")]
    hmi_baud: Option<u32>,

    /// Override the sampling interval in seconds
    #[arg(long, env = "POLL_INTERVAL_S")]
    poll_interval_s: Option<f64>,
}

type SharedResult = Arc<RwLock<MeasurementResult>>;

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    info!("gauge station daemon starting");

    let store = Arc::new(
        ConfigStore::open(&args.config)
            .with_context(|| format!("opening configuration {}", args.config.display()))?,
    );
    apply_overrides(&store, &args)?;

    let latest: SharedResult = Arc::new(RwLock::new(MeasurementResult::unmeasured()));
    let (hmi_tx, hmi_rx) = mpsc::channel::<OutgoingFrame>();

    let handler = ProtocolHandler::new(store.clone());
    {
        let store = store.clone();
        let latest = latest.clone();
        std::thread::Builder::new()
            .name("hmi-serial".to_string())
            .spawn(move || hmi_loop(store, latest, handler, hmi_rx))
            .map_err(|e| anyhow::anyhow!("spawning HMI thread: {e}"))?;
    }

    let hub: Box<dyn HubClient + Send> = if args.mock {
        info!("using mock hub");
        Box::new(MockHub::new())
    } else {
        let addr = store.snapshot().hub_addr;
        warn!("live hub transport not compiled in; using mock hub instead of {addr}");
        Box::new(MockHub::new())
    };

    tokio::spawn(sampling_loop(store, latest, hmi_tx, hub));

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// CLI and environment overrides take effect in memory only, like the
/// original operator workflow: SAVE is what persists.
fn apply_overrides(store: &ConfigStore, args: &Args) -> Result<()> {
    if args.hmi_port.is_none() && args.hmi_baud.is_none() && args.poll_interval_s.is_none() {
        return Ok(());
    }
    let mut config = store.snapshot();
    if let Some(port) = &args.hmi_port {
        config.hmi.serial_port = port.clone();
    }
    if let Some(baud) = args.hmi_baud {
        config.hmi.baud = baud;
    }
    if let Some(interval) = args.poll_interval_s {
        config.poll_interval_s = interval;
    }
    store
        .replace(config)
        .context("applying command-line overrides")?;
    Ok(())
}

/// Fixed-cadence measurement loop. A failed cycle is skipped and the last
/// known-good result stays on the boundary.
async fn sampling_loop(
    store: Arc<ConfigStore>,
    latest: SharedResult,
    hmi_tx: mpsc::Sender<OutgoingFrame>,
    mut hub: Box<dyn HubClient + Send>,
) {
    let mut pushed_version = 0u64;
    loop {
        let config = store.snapshot();
        match run_cycle(hub.as_mut(), &config) {
            Ok(result) => {
                *latest.write().unwrap_or_else(|e| e.into_inner()) = result;
                for frame in hmi_link::live_frames(&result) {
                    let _ = hmi_tx.send(frame);
                }
            }
            Err(e) => warn!("cycle skipped: {e:#}"),
        }
        let version = store.version();
        if version != pushed_version {
            for frame in hmi_link::target_frames(&config.targets) {
                let _ = hmi_tx.send(frame);
            }
            for frame in hmi_link::offset_frames(&config.offsets_mm) {
                let _ = hmi_tx.send(frame);
            }
            pushed_version = version;
        }
        tokio::time::sleep(Duration::from_secs_f64(config.poll_interval_s)).await;
    }
}

fn run_cycle(
    hub: &mut dyn HubClient,
    config: &station_config::StationConfig,
) -> Result<MeasurementResult> {
    let mut readings: Vec<PortReading> = Vec::with_capacity(CHANNEL_COUNT);
    for port in 1..=CHANNEL_COUNT as u8 {
        let reading = hub
            .read_port(port)
            .with_context(|| format!("hub port {port}"))?;
        readings.push(reading);
    }
    let readings: [PortReading; CHANNEL_COUNT] = readings
        .try_into()
        .map_err(|_| anyhow::anyhow!("short port scan"))?;
    let result = measure_engine::evaluate_cycle(
        &readings,
        &config.channels,
        &config.targets,
        &config.offsets_mm,
    )?;
    Ok(result)
}

/// Serial-side loop: reconnects forever, feeding received bytes through the
/// accumulator and writing each command's replies before the next frame.
fn hmi_loop(
    store: Arc<ConfigStore>,
    latest: SharedResult,
    handler: ProtocolHandler,
    rx: mpsc::Receiver<OutgoingFrame>,
) {
    #[cfg(not(feature = "serial"))]
    {
        let _ = (&store, &latest, &handler);
        warn!("built without the serial feature; HMI link disabled");
        // Keep draining so the live-update queue cannot grow without bound
        while rx.recv().is_ok() {}
        return;
    }

    #[cfg(feature = "serial")]
    loop {
        let settings = store.snapshot().hmi;
        if settings.serial_port.eq_ignore_ascii_case("DISABLED") {
            while rx.try_recv().is_ok() {}
            std::thread::sleep(Duration::from_secs(1));
            continue;
        }
        match hmi_link::SerialHmiPort::open(&settings.serial_port, settings.baud) {
            Ok(mut port) => {
                info!("HMI connected on {}", settings.serial_port);
                if let Err(e) = serve_port(&mut port, &store, &latest, &handler, &rx) {
                    tracing::error!("HMI serial error: {e}");
                }
            }
            Err(e) => tracing::error!("HMI open failed on {}: {e}", settings.serial_port),
        }
        std::thread::sleep(Duration::from_secs(2));
    }
}

#[cfg_attr(not(feature = "serial"), allow(dead_code))]
fn serve_port<P: HmiPort>(
    port: &mut P,
    store: &ConfigStore,
    latest: &SharedResult,
    handler: &ProtocolHandler,
    rx: &mpsc::Receiver<OutgoingFrame>,
) -> hmi_link::Result<()> {
    let config = store.snapshot();
    for frame in hmi_link::init_frames(&config.targets, &config.offsets_mm) {
        port.write_frame(&frame)?;
    }
    let mut acc = FrameAccumulator::new();
    let mut buf = [0u8; 64];
    loop {
        // Pending live updates from the sampling loop first
        while let Ok(frame) = rx.try_recv() {
            port.write_frame(&frame)?;
        }
        let n = port.read_chunk(&mut buf)?;
        if n == 0 {
            continue;
        }
        for frame in acc.push(&buf[..n]) {
            let snapshot = *latest.read().unwrap_or_else(|e| e.into_inner());
            for out in handler.handle(&frame, &snapshot) {
                port.write_frame(&out)?;
            }
        }
    }
}

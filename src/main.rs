use color_eyre::{eyre::eyre, Result};
use pointer_ports::{
    BridgeHandle, ChannelSink, HostEvent, LayoutBox, PortMessage, PortsConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const CONFIG_ENV: &str = "POINTER_PORTS_CONFIG";

/// Replays JSON-lines host events from stdin and prints the resulting port
/// messages as JSON lines on stdout.
#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = select_config(
        std::env::var(CONFIG_ENV).ok().map(PathBuf::from),
        PortsConfig::default_path(),
    )?;
    info!("Starting replay with config: {:?}", config);

    let element = Arc::new(match config.element {
        Some(layout) => LayoutBox::new(layout),
        None => {
            warn!("No element geometry configured, element is detached");
            LayoutBox::detached()
        }
    });

    let (sink, port_receiver) = ChannelSink::channel(config.channel_capacity);
    let printer = tokio::spawn(print_messages(port_receiver));

    let bridge = BridgeHandle::spawn(config, element, Arc::new(sink))
        .map_err(|e| eyre!("Failed to spawn bridge: {}", e))?;

    replay(BufReader::new(tokio::io::stdin()), &bridge).await?;

    let stats = bridge.shutdown().await?;
    info!(
        "Replayed {} events ({} failed)",
        stats.events, stats.failures
    );

    // Ends once the last armed throttle timer has fired and released the sink
    let printed = printer
        .await
        .map_err(|e| eyre!("Printer task failed: {}", e))??;
    info!("Printed {} port messages", printed);

    Ok(())
}

/// Feed every decodable line of `reader` to the bridge
///
/// Blank lines are ignored and undecodable lines are logged and skipped.
/// Returns the number of events sent.
async fn replay<R: AsyncBufRead + Unpin>(reader: R, bridge: &BridgeHandle) -> Result<usize> {
    let mut lines = reader.lines();
    let mut line_number = 0usize;
    let mut sent = 0usize;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| eyre!("Failed to read input: {}", e))?
    {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HostEvent>(&line) {
            Ok(event) => {
                debug!(
                    "Line {}: {} ({:?})",
                    line_number,
                    event.kind(),
                    event.propagation()
                );
                bridge.send(event).await?;
                sent += 1;
            }
            Err(e) => warn!("Skipping line {}: {}", line_number, e),
        }
    }

    Ok(sent)
}

async fn print_messages(mut receiver: mpsc::Receiver<PortMessage>) -> Result<usize> {
    let mut printed = 0;
    while let Some(message) = receiver.recv().await {
        let json = serde_json::to_string(&message)
            .map_err(|e| eyre!("Failed to encode {} message: {}", message.port(), e))?;
        println!("{}", json);
        printed += 1;
    }
    Ok(printed)
}

/// Explicit path first, then the default location, then built-in defaults
fn select_config(explicit: Option<PathBuf>, default_path: Option<PathBuf>) -> Result<PortsConfig> {
    if let Some(path) = explicit {
        return PortsConfig::load(&path)
            .map_err(|e| eyre!("Failed to load config from {}: {}", CONFIG_ENV, e));
    }
    match default_path {
        Some(path) => PortsConfig::load_or_default(&path)
            .map_err(|e| eyre!("Failed to load config: {}", e)),
        None => {
            warn!("No config directory available, using defaults");
            Ok(PortsConfig::default())
        }
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    // stdout carries the replayed messages
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}

use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use warmup_server::config::Config;
use warmup_server::host::{Host, HostCommand, HostEvent};
use warmup_server::script::ScriptCommand;
use warmup_server::sim::SimEngine;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Map the simulated server starts on
    #[arg(short = 'm', long, default_value = "strike_at_karkand")]
    map: String,

    /// Seconds between warmup status reports
    #[arg(long)]
    warmup_rate: Option<f64>,

    /// Seconds between freecam scans
    #[arg(long)]
    freecam_rate: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };
    if let Some(rate) = args.warmup_rate {
        config.warmup.sample_rate = rate;
    }
    if let Some(rate) = args.freecam_rate {
        config.freecam.sample_rate = rate;
    }
    config.validate()?;

    let mut engine = SimEngine::new(&args.map);
    engine.boot();

    let mut host = Host::new(engine, &config);
    host.init();

    let (tx, rx) = mpsc::channel::<HostCommand<SimEngine>>(1000);

    // Scripted events from stdin; EOF shuts the host down
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read script input: {}", e);
                    break;
                }
            };
            let command = match ScriptCommand::parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Ignoring script line '{}': {}", line, e);
                    continue;
                }
            };
            let message = match command {
                ScriptCommand::Console { module, args } => {
                    HostCommand::Event(HostEvent::Console { module, args })
                }
                other => HostCommand::Engine(Box::new(move |engine: &mut SimEngine| {
                    engine.apply(other)
                })),
            };
            if tx.send(message).await.is_err() {
                return;
            }
        }
        let _ = tx.send(HostCommand::Shutdown).await;
    });

    info!("Warmup server running on {}", args.map);
    info!("Script commands: connect, disconnect, team, chat, spawn, death, status, map, restart, rcon");

    host.run(rx).await;

    Ok(())
}

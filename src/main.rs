//! slirc-net - console driver for the Straylight IRC client network layer.
//!
//! Usage: `slirc-net [config.toml] [network...]`
//!
//! Connects to the named networks (or `client.autoconnect`, or every
//! configured server), prints inbound lines and sends each stdin line to
//! the current network. `/net <name>` switches the current network.

use anyhow::Context;
use slirc_net::config::{Config, validate};
use slirc_net::metrics;
use slirc_net::network::{NetworkConnection, NetworkEvent, TransportContext};
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for IRC traffic
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr);
    if std::env::var("SLIRC_NET_LOG_FORMAT").is_ok_and(|v| v == "json") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "config.toml".to_string());
    let requested: Vec<String> = args.collect();

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!("Config error: {}", e);
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    metrics::init();

    let names: Vec<String> = if !requested.is_empty() {
        requested
    } else if !config.client.autoconnect.is_empty() {
        config.client.autoconnect.clone()
    } else {
        config.servers.iter().map(|s| s.name.clone()).collect()
    };
    if names.is_empty() {
        anyhow::bail!("no servers configured in {}", config_path);
    }

    let ctx = TransportContext::new();
    let (events_tx, mut events) = mpsc::channel(config.client.event_queue_size.max(1));
    let mut connections: HashMap<String, NetworkConnection> = HashMap::new();

    for name in &names {
        let settings = config
            .server(name)
            .with_context(|| format!("unknown network '{name}'"))?
            .clone();
        info!(network = %name, host = %settings.host, "Starting connection");
        let conn = NetworkConnection::create(name.as_str(), ctx.clone(), settings, events_tx.clone());
        connections.insert(name.clone(), conn);
    }
    drop(events_tx);

    let mut current = names[0].clone();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if !is_current_instance(&connections, &event) {
                    debug!(network = %event.network(), id = %event.id(), "Ignoring event from stale connection");
                    continue;
                }
                print_event(&event);
                if event.is_terminal() {
                    if let Some(conn) = connections.remove(event.network()) {
                        conn.abort().await;
                    }
                    if connections.is_empty() {
                        break;
                    }
                }
            }
            line = stdin.next_line() => {
                match line.context("reading stdin")? {
                    Some(line) => handle_input(&line, &connections, &mut current),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    for (_, conn) in connections.drain() {
        conn.abort().await;
    }
    debug!("{}", metrics::gather_text());
    Ok(())
}

fn is_current_instance(connections: &HashMap<String, NetworkConnection>, event: &NetworkEvent) -> bool {
    connections
        .get(event.network())
        .is_some_and(|conn| conn.id() == event.id())
}

fn handle_input(line: &str, connections: &HashMap<String, NetworkConnection>, current: &mut String) {
    if let Some(name) = line.strip_prefix("/net ") {
        let name = name.trim();
        if connections.contains_key(name) {
            *current = name.to_string();
            info!(network = %name, "Switched network");
        } else {
            warn!(network = %name, "Not connected to that network");
        }
        return;
    }

    match connections.get(current.as_str()) {
        Some(conn) => conn.send(format!("{line}\r\n")),
        None => warn!(network = %current, "Current network is gone"),
    }
}

fn print_event(event: &NetworkEvent) {
    let stamp = event.time().format("%H:%M:%S");
    match event {
        NetworkEvent::Line { network, line, .. } => {
            println!("{stamp} [{network}] {}", String::from_utf8_lossy(line));
        }
        NetworkEvent::Error { network, cause, .. } => {
            println!("{stamp} [{network}] *** connection error: {cause}");
        }
        NetworkEvent::Close { network, .. } => {
            println!("{stamp} [{network}] *** connection closed");
        }
    }
}

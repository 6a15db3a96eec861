//! Stream a server's console to stdout
//!
//! Usage: `ptero_console <server-id>`
//!
//! Lines typed on stdin are sent as console commands.

use anyhow::{bail, Result};
use ptero_lite::bin_common::{load_config_from_env, parse_args};
use ptero_lite::ptero::ws::{ServerStats, ShardHandler};
use ptero_lite::ptero::{init_tracing, ClientApi, PanelConfig, PteroError};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};

struct ConsolePrinter;

impl ShardHandler for ConsolePrinter {
    fn on_ready(&self) {
        info!("Console authenticated");
    }

    fn on_console_output(&self, lines: &[String]) {
        for line in lines {
            println!("{}", line);
        }
    }

    fn on_daemon_output(&self, lines: &[String]) {
        for line in lines {
            println!("[daemon] {}", line);
        }
    }

    fn on_daemon_error(&self, message: &str) {
        warn!("Daemon error: {}", message);
    }

    fn on_install_output(&self, lines: &[String]) {
        for line in lines {
            println!("[install] {}", line);
        }
    }

    fn on_status_update(&self, status: &str) {
        info!("Server status: {}", status);
    }

    fn on_stats_update(&self, stats: &ServerStats) {
        info!(
            "cpu {:.1}% | memory {} / {} MiB | disk {} MiB",
            stats.cpu_absolute,
            stats.memory_bytes / 1024 / 1024,
            stats.memory_limit_bytes / 1024 / 1024,
            stats.disk_bytes / 1024 / 1024
        );
    }

    fn on_jwt_error(&self, message: &str) {
        error!("Token rejected: {}", message);
    }

    fn on_error(&self, error: &PteroError) {
        warn!("{}", error);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = load_config_from_env();
    let config = PanelConfig::load(&config_path)?;

    init_tracing(&config.log_level);
    config.log();

    let args = parse_args();
    let Some(server_id) = args.first() else {
        bail!("Usage: ptero_console <server-id>");
    };

    let api = ClientApi::from_config(&config)?;
    let server = api.get_server(server_id).await?;
    info!("Attaching to '{}' ({})", server.name, server.identifier);

    let shard = api.create_shard(server_id);
    shard.connect(Arc::new(ConsolePrinter)).await?;
    shard.request_logs()?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, closing console");
                break;
            }
            line = stdin.next_line() => {
                match line {
                    Ok(Some(command)) if !command.trim().is_empty() => {
                        if let Err(e) = shard.send_command(command.trim()) {
                            error!("Failed to send command: {}", e);
                            break;
                        }
                    }
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        // stdin closed; keep streaming until Ctrl+C
                        signal::ctrl_c().await?;
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        }
    }

    shard.destroy();
    Ok(())
}

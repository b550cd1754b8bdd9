//! HID-Remote server: entry point.
//!
//! This binary accepts small HTTP `POST` commands and replays them as paced
//! touch and consumer-key reports on the injection transport.
//!
//! # Usage
//!
//! ```text
//! hidremote-server [OPTIONS]
//!
//! Options:
//!   --config <PATH>          TOML config file [default: hidremote.toml]
//!   --bind <ADDR>            Listener IP address (overrides the file)
//!   --port <PORT>            Listener port (overrides the file)
//!   --connection-id <ID>     Treat this transport session as active
//!   --write-config           Write the effective config to --config and exit
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                   | Flag               |
//! |----------------------------|--------------------|
//! | `HIDREMOTE_CONFIG`         | `--config`         |
//! | `HIDREMOTE_BIND`           | `--bind`           |
//! | `HIDREMOTE_PORT`           | `--port`           |
//! | `HIDREMOTE_CONNECTION_ID`  | `--connection-id`  |
//!
//! `RUST_LOG` takes precedence over the config file's `log_level`.
//!
//! # Architecture overview
//!
//! ```text
//! HTTP client  (POST /touch/swipe {...})
//!       ↓
//! infrastructure/http_server   read request, route path to Command
//!       ↓
//! application/dispatch_command session check, payload scan, GestureRequest
//!       ↓
//! infrastructure/worker        one gesture at a time, own thread
//!       ↓
//! application/synthesize_gesture  paced contact / key reports
//!       ↓
//! EventSink  (LoggingEventSink here; the HID transport in a device build)
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hidremote_core::ConnectionHandle;
use hidremote_server::application::dispatch_command::CommandDispatcher;
use hidremote_server::application::synthesize_gesture::GestureSynthesizer;
use hidremote_server::infrastructure::event_sink::LoggingEventSink;
use hidremote_server::infrastructure::pacing::ThreadPacer;
use hidremote_server::infrastructure::storage::config::{load_config_from, save_config_to, AppConfig};
use hidremote_server::infrastructure::{GestureWorker, HttpServer, SessionCell};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// HID-Remote gesture server.
///
/// Accepts touch and key commands over HTTP and plays them back as paced
/// input reports.
#[derive(Debug, Parser)]
#[command(
    name = "hidremote-server",
    about = "HTTP front end and paced gesture synthesizer for HID-Remote",
    version
)]
struct Cli {
    /// Path to the TOML config file.  A missing file means "all defaults".
    #[arg(long, default_value = "hidremote.toml", env = "HIDREMOTE_CONFIG")]
    config: PathBuf,

    /// IP address to bind the listener to.
    #[arg(long, env = "HIDREMOTE_BIND")]
    bind: Option<String>,

    /// TCP port for the listener.
    #[arg(long, env = "HIDREMOTE_PORT")]
    port: Option<u16>,

    /// Transport connection to treat as active from startup.
    #[arg(long, env = "HIDREMOTE_CONNECTION_ID")]
    connection_id: Option<u16>,

    /// Write the effective configuration to `--config` and exit.
    #[arg(long, default_value_t = false)]
    write_config: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(id) = self.connection_id {
            config.transport.connection_id = Some(id);
        }
    }
}

/// Builds the tracing filter: `RUST_LOG` first, then the configured level.
fn env_filter(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn initial_session(config: &AppConfig) -> SessionCell {
    match config.transport.connection_id {
        Some(id) => SessionCell::with_connection(ConnectionHandle::from_raw(id)),
        None => SessionCell::new(),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed and the config file is loaded; flags override
///    the file.
/// 2. `tracing_subscriber` is initialised.
/// 3. The synthesizer is moved onto its worker thread.
/// 4. A Ctrl+C handler is spawned that clears the shared `running` flag.
/// 5. The HTTP server runs until the flag is cleared and every open
///    connection has been answered, then the worker stops.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config_from(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);

    if cli.write_config {
        save_config_to(&cli.config, &config)
            .with_context(|| format!("failed to write config to {}", cli.config.display()))?;
        println!("wrote {}", cli.config.display());
        return Ok(());
    }

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt().with_env_filter(env_filter(&config)).init();

    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    info!(
        "HID-Remote server starting: listen={bind_addr}, config={}",
        cli.config.display()
    );

    // ── Wiring ────────────────────────────────────────────────────────────────
    let session = Arc::new(initial_session(&config));
    let synthesizer = GestureSynthesizer::new(
        Arc::new(LoggingEventSink::new()),
        Arc::new(ThreadPacer),
        config.timing.to_timing(),
    );
    let worker = Arc::new(
        GestureWorker::with_depth(synthesizer, config.server.queue_depth)
            .context("failed to start gesture worker")?,
    );
    let dispatcher = Arc::new(CommandDispatcher::new(session.clone(), worker.clone()));

    let server = HttpServer::bind(&bind_addr, dispatcher, config.server.max_body_bytes).await?;

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Main server loop ───────────────────────────────────────────────────────
    // Returns only after in-flight connections have written their replies.
    server.run(running).await?;

    // Blocking join; keep it off the async worker threads.
    tokio::task::spawn_blocking(move || worker.shutdown())
        .await
        .context("gesture worker shutdown task failed")?;

    info!("HID-Remote server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["hidremote-server"]);

        // Assert
        assert_eq!(cli.config, PathBuf::from("hidremote.toml"));
        assert_eq!(cli.bind, None);
        assert_eq!(cli.port, None);
        assert_eq!(cli.connection_id, None);
        assert!(!cli.write_config);
    }

    #[test]
    fn test_cli_port_override() {
        let cli = Cli::parse_from(["hidremote-server", "--port", "9999"]);
        assert_eq!(cli.port, Some(9999));
    }

    #[test]
    fn test_cli_rejects_out_of_range_port() {
        let result = Cli::try_parse_from(["hidremote-server", "--port", "70000"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        // Arrange
        let cli = Cli::parse_from([
            "hidremote-server",
            "--bind",
            "127.0.0.1",
            "--port",
            "18080",
            "--connection-id",
            "4",
        ]);
        let mut config = AppConfig::default();

        // Act
        cli.apply_overrides(&mut config);

        // Assert
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.port, 18080);
        assert_eq!(config.transport.connection_id, Some(4));
    }

    #[test]
    fn test_no_overrides_keep_file_values() {
        let cli = Cli::parse_from(["hidremote-server"]);
        let mut config = AppConfig::default();
        config.server.port = 1234;
        config.transport.connection_id = Some(9);

        cli.apply_overrides(&mut config);

        assert_eq!(config.server.port, 1234);
        assert_eq!(config.transport.connection_id, Some(9));
    }

    #[test]
    fn test_initial_session_follows_transport_config() {
        let mut config = AppConfig::default();
        assert!(!initial_session(&config).current().is_connected());

        config.transport.connection_id = Some(0);
        assert_eq!(initial_session(&config).current().raw(), 0);
    }
}

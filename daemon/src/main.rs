//! Eisbruecke – Einstiegspunkt
//!
//! Parst die Launcher-Argumente, initialisiert das Logging und startet
//! den Daemon.

use anyhow::Result;
use clap::Parser;
use eisbruecke_daemon::{cli::Cli, Daemon};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging_initialisieren(&cli.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        spieler = cli.id,
        login = %cli.login,
        "Eisbruecke wird initialisiert"
    );

    let daemon = Daemon::neu(cli.als_optionen());
    daemon.starten().await?;

    Ok(())
}

/// Initialisiert tracing-subscriber mit dem konfigurierten Level
///
/// `RUST_LOG` hat Vorrang vor dem `--log-level`-Flag.
fn logging_initialisieren(level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(true).init();
}

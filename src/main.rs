//! Entry point for `timefetch`.
//!
//! Parses CLI arguments, sets up logging and runs one acquisition. The exit
//! status is non-zero when no time could be acquired.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use timefetch::core::{Config, Logger, ProtocolKind, TracingLogger};
use timefetch::network::{DnsResolver, NetTransport};
use timefetch::time::{acquire_time, sync_clock, SystemClock};

/// Fetch the current time from a time server.
#[derive(Parser)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("protocol").args(["ntp", "daytime", "time"])))]
struct Cli {
    /// Use the network time protocol (default).
    #[arg(long)]
    ntp: bool,

    /// Use the RFC 867 daytime protocol.
    #[arg(long)]
    daytime: bool,

    /// Use the RFC 868 time protocol.
    #[arg(long)]
    time: bool,

    /// Retry count, 0 for the default of 20.
    #[arg(short, long, default_value_t = 0)]
    retries: u32,

    /// Set the system clock to the acquired time.
    #[arg(short, long)]
    sync: bool,

    /// Log level (error, info, debug, ...); RUST_LOG takes precedence.
    #[arg(short, long, default_value = "info")]
    verbose: String,

    /// Server queried over NTP.
    #[arg(long)]
    ntp_server: Option<String>,

    /// Server queried over the daytime and time protocols.
    #[arg(long)]
    time_server: Option<String>,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if self.daytime {
            config.protocol = Some(ProtocolKind::Daytime);
        } else if self.time {
            config.protocol = Some(ProtocolKind::Time);
        } else if self.ntp {
            config.protocol = Some(ProtocolKind::Ntp);
        }
        if let Some(host) = &self.ntp_server {
            config.ntp_host = host.clone();
        }
        if let Some(host) = &self.time_server {
            config.stream_host = host.clone();
        }
        config.retries = self.retries;
        config.sync_clock = self.sync;
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.verbose))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let log = Arc::new(TracingLogger);
    let config = cli.config();

    let resolver = match DnsResolver::from_system_conf() {
        Ok(resolver) => resolver,
        Err(e) => {
            log.error(format_args!("{}", e));
            return ExitCode::FAILURE;
        }
    };

    let ts = match acquire_time(
        config.protocol,
        &config,
        resolver,
        NetTransport::default(),
        log.clone(),
    )
    .await
    {
        Ok(ts) => ts,
        Err(e) => {
            log.error(format_args!("{}", e));
            return ExitCode::FAILURE;
        }
    };

    if ts.is_failure() {
        return ExitCode::FAILURE;
    }

    if config.sync_clock && sync_clock(&SystemClock, ts, &*log).is_err() {
        tracing::debug!("keeping exit status after failed sync");
    }

    ExitCode::SUCCESS
}

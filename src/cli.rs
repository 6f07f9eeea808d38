use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "drroute",
    version,
    about = "Controllable background health poller with an HTTP control plane",
    long_about = "Starts, stops and reports on a background poller that repeatedly probes an HTTP URL or a raw TCP host:port and tallies the status codes it sees."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "DRROUTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Where to write the process id
    #[arg(long, value_name = "FILE")]
    pub pid_file: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "DRROUTE_JSON_LOGS")]
    pub json_logs: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Command line flags take precedence over file and environment settings.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(pid_file) = &self.pid_file {
            config.pid_file = Some(pid_file.clone());
        }
    }
}

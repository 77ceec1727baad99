use clap::{Parser, ValueEnum};
use roomcast_core::{AppConfigTrait, RelayConfig, RoomHub};
use roomcast_http::{
    init_logging, log_shutdown_info, log_startup_info, start_server, HttpError, HttpResult,
    LoggingConfig, ServerConfig,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const SERVICE_NAME: &str = "roomcast";

#[derive(Parser)]
#[command(name = "roomcast")]
#[command(about = "Room-based WebSocket message relay", version)]
struct Cli {
    /// Address to listen on (overrides ROOMCAST_BIND)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Directory of static files (overrides ROOMCAST_PUBLIC_DIR)
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Log filter directives, e.g. "roomcast_core=debug,tower_http=warn"
    #[arg(long)]
    log_filter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
    Plain,
}

impl Cli {
    fn logging_config(&self) -> LoggingConfig {
        let config = match self.log_format {
            LogFormat::Json => LoggingConfig::production(),
            LogFormat::Pretty => LoggingConfig::development(),
            LogFormat::Plain => LoggingConfig {
                pretty_print: false,
                ..LoggingConfig::default()
            },
        };
        let config = match &self.log_filter {
            Some(filter) => config.with_env_filter(filter.clone()),
            None => config,
        };
        config.with_service(SERVICE_NAME, env!("CARGO_PKG_VERSION"))
    }

    fn server_config(&self, base: ServerConfig) -> ServerConfig {
        let mut config = base;
        if let Some(bind) = self.bind {
            config = config.with_bind_addr(bind);
        }
        if let Some(public_dir) = &self.public_dir {
            config = config.with_public_dir(public_dir.clone());
        }
        config
    }
}

#[tokio::main]
async fn main() -> HttpResult<()> {
    let cli = Cli::parse();
    init_logging(cli.logging_config())
        .map_err(|e| HttpError::startup(format!("Failed to initialize logging: {}", e)))?;

    let relay_config = RelayConfig::from_env()?;
    let server_config = cli.server_config(ServerConfig::from_env()?);

    log_startup_info(SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    info!(
        max_messages = relay_config.max_messages,
        max_rooms = relay_config.max_rooms,
        outbound_queue_capacity = relay_config.outbound_queue_capacity,
        "relay limits"
    );

    let hub = Arc::new(RoomHub::new(relay_config));
    start_server(server_config, hub).await?;

    log_shutdown_info(SERVICE_NAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_flag_overrides_preset() {
        let cli = Cli::try_parse_from([
            "roomcast",
            "--log-format",
            "json",
            "--log-filter",
            "roomcast_core=trace",
        ])
        .unwrap();
        let config = cli.logging_config();
        assert!(config.json_format);
        assert_eq!(config.env_filter.as_deref(), Some("roomcast_core=trace"));
        assert_eq!(config.service_name.as_deref(), Some(SERVICE_NAME));
    }

    #[test]
    fn test_preset_filter_without_flag() {
        let cli = Cli::try_parse_from(["roomcast"]).unwrap();
        assert_eq!(
            cli.logging_config().env_filter,
            LoggingConfig::development().env_filter
        );
    }

    #[test]
    fn test_flags_override_server_config() {
        let cli =
            Cli::try_parse_from(["roomcast", "--bind", "0.0.0.0:9001", "--public-dir", "/srv"])
                .unwrap();
        let config = cli.server_config(ServerConfig::default());
        assert_eq!(config.bind_addr.port(), 9001);
        assert_eq!(config.public_dir, PathBuf::from("/srv"));
    }
}

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use appdock::config::{AppdockConfig, ConfigLoader};
use appdock::http::{AppHandler, HttpRequest, HttpResponse};
use appdock::logging::{init_logging, LogConfig};
use appdock::server::{ListenerHost, RouteBindingPort, RouteTable};
use appdock::HttpConnector;

#[derive(Debug, Parser)]
#[command(name = "appdock", about = "Multi-listener HTTP host for web apps")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "APPDOCK_CONFIG")]
    config: Option<String>,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    sample_config: bool,
}

/// Built-in handler serving a small status page for apps mounted from the
/// configuration. Hosts embedding appdock register their own handlers.
struct StatusHandler {
    app_name: String,
}

impl StatusHandler {
    fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl AppHandler for StatusHandler {
    fn handle(&self, request: HttpRequest) -> HttpResponse {
        let body = serde_json::json!({
            "app": self.app_name,
            "path": request.path,
            "status": "running",
        });
        HttpResponse::ok(body.to_string()).with_header("content-type", "application/json")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.sample_config {
        print!("{}", AppdockConfig::sample());
        return Ok(());
    }

    let config = ConfigLoader::new()
        .load_from_file(cli.config.as_deref())
        .load_from_env()
        .build()?;

    let mut log_config = LogConfig::from_config(&config.logging);
    if let Some(level) = &cli.log_level {
        log_config = log_config.with_level(level);
    }
    let _log_guard = init_logging(&log_config)?;

    info!("Starting {}.", config.server.name);

    let table = Arc::new(RouteTable::new());
    let binding_port = Arc::new(RouteBindingPort::new(Arc::clone(&table)));
    let connector = Arc::new(HttpConnector::new(binding_port));
    let host = ListenerHost::new(table, Arc::clone(&connector));

    for listener in &config.listeners {
        host.start_listener(listener)
            .await
            .with_context(|| format!("failed to start listener '{}'", listener.id))?;
    }

    for app in &config.apps {
        let handler = Arc::new(StatusHandler::new(&app.name));
        connector.register_app(&app.name, &app.context_path, handler)?;
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("Shutting down {}.", config.server.name);
    connector.unregister_all_apps();
    host.shutdown();
    Ok(())
}

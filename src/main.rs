use tracing::{error, info, warn};

use subsync::{Config, SyncOrchestrator, WebServer};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = subsync::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        subsync::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    info!("subsync starting (settings: {})", config.settings.path);

    // The endpoint goes up first so a runtime_config_url pointing at this
    // process can be served during the sync.
    let web_running = if config.web.enabled {
        match WebServer::new(&config.web, &config.access) {
            Ok(server) => match server.run_with_addr().await {
                Ok(_) => true,
                Err(e) => {
                    error!(error = %e, "Failed to start web server");
                    false
                }
            },
            Err(e) => {
                error!(error = %e, "Invalid web configuration");
                false
            }
        }
    } else {
        false
    };

    match SyncOrchestrator::from_config(&config) {
        Ok(orchestrator) => orchestrator.run().await,
        Err(e) => warn!(error = %e, "Subscription sync unavailable"),
    }

    if web_running {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to wait for shutdown signal");
        }
        info!("Shutting down");
    }
}

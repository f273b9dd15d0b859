use log::{error, info, warn};
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use std::time::Duration;

/// How often expired pending authorizations and idle credentials are purged.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!(
        "Starting up TikTok connect service ({}) on port {}",
        config.runtime_env(),
        config.port
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(db.as_ref(), None).await {
        error!("Failed to apply database migrations: {e}");
        std::process::exit(1);
    }

    let service_state = service::AppState::new(config, &db);

    let app_state = match web::AppState::new(service_state) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Invalid configuration: {} ({})", e, e.details());
            std::process::exit(1);
        }
    };

    let flow = Arc::clone(&app_state.flow);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = flow.cleanup_expired();
            if removed > 0 {
                info!("Purged {} expired pending authorizations", removed);
            }
            let idle = flow.credentials().cleanup_expired();
            if idle > 0 {
                info!("Purged credentials of {} idle sessions", idle);
            }
        }
    });

    if let Err(e) = web::init_server(app_state).await {
        warn!("Server stopped: {e}");
        std::process::exit(1);
    }
}

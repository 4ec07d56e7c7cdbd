/// Orchestrator module - wires all components together
///
/// The orchestrator owns startup and shutdown:
/// - Opens and migrates the observation database
/// - Starts the probe scheduler, the only writer to the store
/// - Serves the status API, which only reads from the store
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::database::{DatabaseImpl, ObservationStore, initialize_database};
use crate::error::AppError;
use crate::monitoring::{Checker, HttpChecker, ProbeScheduler, Prober};
use crate::pool::open_pool;
use crate::registry::TargetRegistry;
use crate::routes;
use crate::status::StatusAggregator;

/// Main orchestrator for the pingboard service
pub struct Orchestrator {
    config: Arc<Config>,
    registry: Arc<TargetRegistry>,
    store: Arc<dyn ObservationStore>,
    checker: Arc<dyn Checker>,
}

impl Orchestrator {
    /// Create and start a new orchestrator, returning when the HTTP server stops
    pub async fn start(config: Config) -> Result<(), AppError> {
        let orchestrator = Self::new(config).await?;
        orchestrator.run().await
    }

    async fn new(config: Config) -> Result<Self, AppError> {
        let registry = Arc::new(TargetRegistry::new(config.targets.clone())?);
        info!("Monitoring {} targets", registry.len());

        info!("Opening database at {}...", config.database.path.display());
        let store = Arc::new(open_database(&config).await?);

        let checker = Arc::new(HttpChecker::new(config.prober.timeout())?);

        Ok(Self { config: Arc::new(config), registry, store, checker })
    }

    async fn run(self) -> Result<(), AppError> {
        let prober = Arc::new(Prober::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.checker),
            Arc::clone(&self.store),
        ));
        let scheduler = ProbeScheduler::new(prober, self.config.prober.interval()).start();

        let aggregator = web::Data::new(StatusAggregator::new(self.registry, self.store));

        let ip: IpAddr = self.config.server.bind.parse()?;
        let addr = SocketAddr::new(ip, self.config.server.port);
        info!("Serving status API on http://{}", addr);

        let served = HttpServer::new(move || {
            App::new().app_data(aggregator.clone()).configure(routes::routes)
        })
        .bind(addr)?
        .run()
        .await;

        scheduler.abort();
        info!("Server stopped, probe scheduler cancelled");

        Ok(served?)
    }
}

/// Open the pool and bring the schema up to date
async fn open_database(config: &Config) -> anyhow::Result<DatabaseImpl> {
    let pool = open_pool(&config.database.path, config.database.pool_size)
        .await
        .context("failed to open database")?;

    let conn = pool.get().await.context("failed to get a database connection")?;
    initialize_database(&conn).await.context("failed to run migrations")?;
    drop(conn);

    Ok(DatabaseImpl::new_from_pool(pool))
}

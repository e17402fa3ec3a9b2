//! # Proposal-Board Binary
//!
//! The entry point that reads the settings, picks a store backend and serves the API.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use configs::{LogSettings, Settings, StoreBackend};
use pb_api::handlers::AppState;
use pb_api::middleware::{cors_policy, security_headers, standard_middleware};
use pb_auth_simple::OwnerAuthorizer;
use pb_core::{CatalogPorts, PostCatalog, SystemClock, ThreadRandom};
use pb_store_memory::MemoryBoardStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(feature = "db-sqlite")]
use pb_db_sqlite::SqliteBoardRepo;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    init_tracing(&settings.log);

    let ports = build_ports(&settings).await?;
    let state = web::Data::new(AppState {
        catalog: PostCatalog::new(ports, settings.catalog.policy()),
    });

    let (host, port) = settings.bind_addr();
    let origins = settings.server.allowed_origins.clone();
    tracing::info!(%host, port, backend = ?settings.database.backend, "proposal board starting");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(standard_middleware())
            .wrap(cors_policy(&origins))
            .wrap(security_headers())
            .configure(pb_api::configure_routes)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("failed to bind {host}:{port}"))?
    .run()
    .await?;

    Ok(())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_ports(settings: &Settings) -> anyhow::Result<CatalogPorts> {
    let authorizer = Arc::new(OwnerAuthorizer::new());
    let clock = Arc::new(SystemClock);
    let rng = Arc::new(ThreadRandom);

    match settings.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; posts are lost on restart");
            let store = Arc::new(MemoryBoardStore::new());
            Ok(CatalogPorts {
                posts: store.clone(),
                votes: store.clone(),
                comments: store,
                authorizer,
                clock,
                rng,
            })
        }
        #[cfg(feature = "db-sqlite")]
        StoreBackend::Sqlite => {
            let repo = SqliteBoardRepo::new(&settings.database.url)
                .await
                .with_context(|| format!("failed to open {}", settings.database.url))?;
            let repo = Arc::new(repo);
            Ok(CatalogPorts {
                posts: repo.clone(),
                votes: repo.clone(),
                comments: repo,
                authorizer,
                clock,
                rng,
            })
        }
        #[cfg(not(feature = "db-sqlite"))]
        StoreBackend::Sqlite => anyhow::bail!("built without the db-sqlite feature"),
    }
}

//! Process wiring: settings → database → modules → HTTP server.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use inkwell_db::{Database, DbModule};
use inkwell_kernel::{
    settings::{DatabaseBackend, Settings},
    InitCtx, ModuleRegistry,
};

use crate::modules;
use crate::posts::repository::{MemoryPostRepository, MongoPostRepository, SharedPostRepository};

/// Build the registry for the configured backend.
///
/// With the MongoDB backend the connection is opened here, and an unreachable
/// server is an error. The `db` core module owns the connection from then on
/// and closes it on shutdown.
pub async fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();

    let posts: SharedPostRepository = match settings.database.backend {
        DatabaseBackend::Mongodb => {
            let database = Database::connect(&settings.database)
                .await
                .with_context(|| "failed to connect to the document store")?;
            let repository = MongoPostRepository::new(&database, &settings.database.collection);
            registry.register_core(Arc::new(DbModule::new(database)));
            Arc::new(repository)
        }
        DatabaseBackend::Memory => {
            tracing::warn!("using in-memory post storage; data is lost on exit");
            Arc::new(MemoryPostRepository::new())
        }
    };

    modules::register_all(&mut registry, posts);
    Ok(registry)
}

/// Registry backed by the in-memory store, for tooling that needs the module
/// set but no database (OpenAPI export, tests).
pub fn memory_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(MemoryPostRepository::new()));
    registry
}

/// Run the full lifecycle until `shutdown` resolves.
pub async fn run<F>(settings: &Settings, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let registry = build_registry(settings).await?;
    let ctx = InitCtx { settings };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = inkwell_http::start_server(&registry, settings, shutdown).await;

    // Modules are stopped even when the server failed
    let stopped = registry.stop_all().await;
    served?;
    stopped?;

    tracing::info!("inkwell shut down cleanly");
    Ok(())
}

/// Connect to the configured database and ping it once.
pub async fn ping(settings: &Settings) -> anyhow::Result<()> {
    if settings.database.backend == DatabaseBackend::Memory {
        tracing::info!("memory backend configured; nothing to ping");
        return Ok(());
    }

    let database = Database::connect(&settings.database)
        .await
        .with_context(|| "failed to connect to the document store")?;
    database.shutdown().await;
    Ok(())
}

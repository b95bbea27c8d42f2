use std::sync::Arc;

use notifier_http::HttpNotifierFactory;
use relay_api::{Notifier, NotifierFactory, RecordStore, StoreFactory};
use relay_engine::config::{NotifierConfig, RelayConfig, StoreConfig, config_json_or_empty};
use relay_engine::{EngineError, IngestLoop, Ingestor};
use store_http::HttpStoreFactory;
use store_memory::MemoryStoreFactory;

use crate::error::ServerError;

/// Create the store named by `[store] kind`.
pub fn create_store(cfg: &StoreConfig) -> Result<Arc<dyn RecordStore>, ServerError> {
    let factory: &dyn StoreFactory = match cfg.kind.as_str() {
        "memory" => &MemoryStoreFactory,
        "http" => &HttpStoreFactory,
        other => {
            return Err(ServerError::UnknownKind {
                component: "store",
                kind: other.to_string(),
            });
        }
    };
    let config_json = config_json_or_empty(&cfg.config)?;
    let store = factory
        .create(&config_json)
        .map_err(|e| EngineError::Plugin(e.with_context(format!("store '{}'", cfg.kind))))?;
    Ok(store)
}

/// Create the notifier named by `[notifier] kind`; `None` when absent or `"none"`.
pub fn create_notifier(cfg: Option<&NotifierConfig>) -> Result<Option<Arc<dyn Notifier>>, ServerError> {
    let Some(cfg) = cfg else {
        return Ok(None);
    };
    let factory: &dyn NotifierFactory = match cfg.kind.as_str() {
        "none" => return Ok(None),
        "http" => &HttpNotifierFactory,
        other => {
            return Err(ServerError::UnknownKind {
                component: "notifier",
                kind: other.to_string(),
            });
        }
    };
    let config_json = config_json_or_empty(&cfg.config)?;
    let notifier = factory
        .create(&config_json)
        .map_err(|e| EngineError::Plugin(e.with_context(format!("notifier '{}'", cfg.kind))))?;
    Ok(Some(notifier))
}

/// Wire store, notifier and listener into an idle ingest loop.
pub fn build(config: &RelayConfig) -> Result<IngestLoop, ServerError> {
    let store = create_store(&config.store)?;
    tracing::info!(kind = %config.store.kind, "store created");

    let mut ingestor = Ingestor::new(store, config.ingest.throttle())
        .ignoring(config.ingest.ignore_movement.clone());

    match (create_notifier(config.notifier.as_ref())?, config.notifier.as_ref()) {
        (Some(notifier), Some(cfg)) => {
            tracing::info!(kind = %cfg.kind, dry_run = cfg.dry_run, "notifier created");
            ingestor = ingestor.with_notifier(notifier, cfg.dry_run);
        }
        _ => tracing::info!("notifications disabled"),
    }

    tracing::info!(
        throttle_ms = config.ingest.throttle_ms,
        location_line = config.layout.location_line,
        machine_line = config.layout.machine_line,
        movement_line = config.layout.movement_line,
        movement_offset = config.layout.movement_offset,
        "ingest configured"
    );
    Ok(IngestLoop::new(&config.listener, config.layout, ingestor))
}

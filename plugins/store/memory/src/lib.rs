use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;

use relay_api::{PluginError, Record, RecordStore, StoreFactory};

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreConfig
// ═══════════════════════════════════════════════════════════════

fn default_max_records() -> usize {
    10_000
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryStoreConfig {
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryStore
// ═══════════════════════════════════════════════════════════════

/// In-process ring buffer. Nothing survives a restart — meant for
/// offline runs and tests. The oldest reading is evicted once
/// `max_records` is reached.
pub struct MemoryStore {
    records: RwLock<VecDeque<Record>>,
    max_records: usize,
}

impl MemoryStore {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(max_records.min(1024))),
            max_records: max_records.max(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(default_max_records())
    }
}

impl RecordStore for MemoryStore {
    fn list(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Record>, PluginError>> + Send + '_>> {
        Box::pin(async move {
            let buf = self.records.read().await;
            Ok(buf.iter().cloned().collect())
        })
    }

    fn save(&self, record: &Record) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + '_>> {
        let record = record.clone();
        Box::pin(async move {
            let mut buf = self.records.write().await;
            if buf.len() >= self.max_records {
                buf.pop_front();
            }
            buf.push_back(record);
            Ok(())
        })
    }

    fn latest(&self) -> Pin<Box<dyn Future<Output = Result<Option<Record>, PluginError>> + Send + '_>> {
        Box::pin(async move { Ok(self.records.read().await.back().cloned()) })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreFactory
// ═══════════════════════════════════════════════════════════════

pub struct MemoryStoreFactory;

impl StoreFactory for MemoryStoreFactory {
    fn create(&self, config_json: &str) -> Result<Arc<dyn RecordStore>, PluginError> {
        let config: MemoryStoreConfig = if config_json == "{}" {
            MemoryStoreConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| PluginError::config(format!("memory store config: {e}")))?
        };
        Ok(Arc::new(MemoryStore::new(config.max_records)))
    }
}

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::PluginError;
use crate::record::Record;

/// Persistence collaborator.
///
/// The relay never sees a schema: it lists what was saved (insertion order,
/// most recent last) and hands over new records.
pub trait RecordStore: Send + Sync {
    /// All stored records, oldest first.
    fn list(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Record>, PluginError>> + Send + '_>>;

    /// Persist one record.
    fn save(
        &self,
        record: &Record,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + '_>>;

    /// Most recently saved record, `None` for an empty store.
    ///
    /// Default: last element of `list()`. Stores that can answer cheaper
    /// should override it.
    fn latest(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Record>, PluginError>> + Send + '_>> {
        Box::pin(async move {
            let mut records = self.list().await?;
            Ok(records.pop())
        })
    }
}

/// Builds a store from its JSON config (`"{}"` when the config table is absent).
pub trait StoreFactory: Send + Sync {
    fn create(&self, config_json: &str) -> Result<Arc<dyn RecordStore>, PluginError>;
}

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::PluginError;
use crate::record::{Email, Subscriber};

/// Email collaborator: who to tell, and how to tell them.
pub trait Notifier: Send + Sync {
    fn subscribers(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Subscriber>, PluginError>> + Send + '_>>;

    fn send(&self, email: &Email) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + '_>>;
}

/// Builds a notifier from its JSON config (`"{}"` when the config table is absent).
pub trait NotifierFactory: Send + Sync {
    fn create(&self, config_json: &str) -> Result<Arc<dyn Notifier>, PluginError>;
}

pub mod error;
pub mod notifier;
pub mod record;
pub mod store;

pub use error::{ErrorKind, PluginError};
pub use notifier::{Notifier, NotifierFactory};
pub use record::{Email, Record, Subscriber};
pub use store::{RecordStore, StoreFactory};

pub mod config;
pub mod dedup;
pub mod error;
pub mod listener;
pub mod notify;
pub mod parser;

pub use dedup::{Ingestor, Outcome, should_persist};
pub use error::{EngineError, IngestError, ParseError};
pub use listener::{IngestLoop, IngestStats, LoopState};
pub use parser::{PayloadLayout, parse};

use relay_api::PluginError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),
}

impl EngineError {
    /// Add context to the error.
    ///
    /// For `Plugin` variant, context is added to the inner `PluginError`.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Plugin(e) => EngineError::Plugin(e.with_context(ctx)),
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
        }
    }
}

/// Payload rejected by the parser. The datagram is dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed payload: {lines} lines, need at least {required}")]
    TooFewLines { lines: usize, required: usize },

    #[error("malformed payload: line {line} has {chars} chars, need at least {offset}")]
    LineTooShort { line: usize, chars: usize, offset: usize },

    #[error("malformed payload: {field} is empty")]
    EmptyField { field: &'static str },
}

/// Per-datagram and listener failures of the ingest pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    MalformedPayload(#[from] ParseError),

    #[error("store unavailable: {0}")]
    StoreUnavailable(PluginError),

    #[error("notifier unavailable: {0}")]
    NotifierUnavailable(PluginError),

    /// Bind or receive failed. The loop is stopped.
    #[error("listener {addr}: {source}")]
    ListenerFatal {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Only listener failures end the loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestError::ListenerFatal { .. })
    }
}

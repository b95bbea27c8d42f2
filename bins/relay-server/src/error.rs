#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("unknown {component} kind '{kind}'")]
    UnknownKind { component: &'static str, kind: String },

    #[error("{0}")]
    Engine(#[from] relay_engine::EngineError),

    #[error("{0}")]
    Ingest(#[from] relay_engine::IngestError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}

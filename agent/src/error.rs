//! Error taxonomy for the agent binary.
//!
//! Only [`AgentError::Config`] and [`AgentError::Resource`] are meant to
//! reach `main` as a fatal, non-zero exit; everything else is handled where
//! it occurs and logged.

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("transient capture error: {0}")]
    TransientCapture(String),

    #[error(transparent)]
    MalformedRecord(#[from] bt_types::MalformedRecord),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

//! Error taxonomy for the correlator binary.

#[derive(Debug, thiserror::Error)]
pub enum CorrelatorError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No antenna location row exists at or before the requested timestamp.
    /// Propagated to the caller; the one fingerprint pair in question is
    /// treated as non-same rather than aborting the run (§4.8, §7).
    #[error("no location for antenna {antenna_id} at or before t={timestamp}")]
    Lookup { antenna_id: u32, timestamp: i64 },

    /// Indicates a bug: an internal call site used a parameter outside its
    /// closed domain (e.g. an unrecognized `end` argument).
    #[error("invariant violated: {0}")]
    Invariant(String),
}

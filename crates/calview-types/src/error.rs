//! Error types shared across all Calview crates.

/// Errors that can occur across the Calview engine.
///
/// Each variant corresponds to a different subsystem: transport, wire
/// decoding, configuration, or the reconciliation core. Transport failures
/// are recovered locally by the request issuer and never reach rendering
/// code; a `ConcurrencyGuard` error indicates a programming bug and is
/// treated as fatal.
#[derive(Debug, thiserror::Error)]
pub enum CalviewError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("reconciliation error: {0}")]
    Reconcile(String),

    #[error("concurrency guard violation: {0}")]
    ConcurrencyGuard(String),
}

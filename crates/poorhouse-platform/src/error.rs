//! Engine error types.

use poorhouse_synth::SynthError;
use thiserror::Error;

/// Errors from the control side of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EngineError {
    /// The control queue is full; the event was dropped
    #[error("control queue full, event dropped")]
    QueueFull,

    /// The audio engine has been dropped
    #[error("audio engine disconnected")]
    Disconnected,

    /// Synth configuration failed
    #[error(transparent)]
    Synth(#[from] SynthError),
}

/// Result alias for engine operations.
pub type Result<T> = core::result::Result<T, EngineError>;

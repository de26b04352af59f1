//! Errors raised while talking to the OWL server.
//!
//! Every connection-level failure is terminal for the session: the client
//! logs it, moves to the `Error` state, and waits for an external reset.
//! Nothing here crosses the public `poll`/`notify` boundary as a panic or a
//! propagated `Err`.

use crate::protocol::ErrorCode;
use crate::types::SampleCategory;

#[derive(Debug, thiserror::Error)]
pub enum OwlError {
    /// The driver's init call returned a negative result, or the driver is
    /// entirely unavailable.
    #[error("driver init failed (rc {rc})")]
    InitFailed { rc: i32 },

    /// The server reported an error immediately after a successful init.
    #[error("connect rejected by server: {code}")]
    ConnectRejected { code: ErrorCode },

    /// A set-parameter call during connect was followed by a non-zero
    /// error code.
    #[error("server rejected parameter {param:#06x}: {code}")]
    ParameterRejected { param: u32, code: ErrorCode },

    /// A get-samples call was followed by a non-zero error code. Aborts the
    /// remainder of the current tick.
    #[error("{category} retrieval failed: {code}")]
    RetrievalFailed {
        category: SampleCategory,
        code: ErrorCode,
    },

    /// Configuration file I/O failed.
    #[error("config i/o error: {0}")]
    Config(#[from] std::io::Error),
}

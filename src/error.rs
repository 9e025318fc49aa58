use thiserror::Error;

use crate::clock::ClockState;

/// Errors raised by the typing engine.
///
/// Every variant is an integration bug on the caller's side: the input
/// surface should have been disabled, or the clock driven out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Advance was requested with no pending characters left on the tape
    #[error("cannot advance: every character on the tape has been typed")]
    EmptyTape,

    /// Retreat was requested with no typed characters to undo
    #[error("cannot retreat: nothing has been typed yet")]
    EmptyHistory,

    /// The session clock was asked to do something its state does not allow
    #[error("clock cannot {operation} while {from}")]
    InvalidStateTransition {
        from: ClockState,
        operation: &'static str,
    },

    /// The input changed by more than one character in a single event
    #[error("input changed by {delta} characters at once; bulk input is rejected")]
    UnsupportedBulkInput { delta: isize },

    /// Passage content arrived after the session had already finished
    #[error("passage content arrived after the session finished")]
    PassageAfterFinish,
}

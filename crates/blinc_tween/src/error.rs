//! Tween engine error types

use crate::values::ValueKind;
use thiserror::Error;

/// Errors surfaced at the engine's API boundary
///
/// All of these are caller-misuse conditions detected synchronously when a
/// tween is created. Nothing is ever enqueued when one is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenError {
    /// No interpolator is registered for the start value's kind
    #[error("No interpolator registered for value kind {0}")]
    UnsupportedKind(ValueKind),

    /// Start and end values are of different kinds
    #[error("Tween endpoints differ in kind: start is {start}, end is {end}")]
    KindMismatch { start: ValueKind, end: ValueKind },

    /// The engine behind a weak handle no longer exists
    #[error("Tween engine has been dropped")]
    EngineDropped,
}

/// Result type for tween operations
pub type Result<T> = std::result::Result<T, TweenError>;

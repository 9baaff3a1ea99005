//! Error taxonomy for the clipboard pipeline.
//!
//! Every variant except [`ClipboardError::UnknownOperation`] is reported
//! to callers of the bool-returning operations as `false`. Only the
//! dispatcher's `invoke` lets `UnknownOperation` through, since it marks a
//! caller bug rather than a runtime condition.

use crate::host::HostError;

/// Errors produced by the support check, resolver, writer and dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// The host does not support the synchronous copy command.
    #[error("synchronous copy command is not supported")]
    Unsupported,

    /// The selector input has an unrecognized shape, or the host could
    /// not parse the selector query.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// The selector matched no nodes, or every node yielded an empty value.
    #[error("selection is empty")]
    EmptySelection,

    /// The insert value does not coerce to a string.
    #[error("cannot insert a value of type {0}")]
    InvalidPayload(&'static str),

    /// The copy command threw, was rejected, or the scratch surface could
    /// not be prepared.
    #[error("clipboard write failed: {0}")]
    WriteFailure(#[from] HostError),

    /// `invoke` was called with a name that is not an operation.
    #[error("method {0} doesn't exist for clipboard")]
    UnknownOperation(String),
}

//! Capability check: is the synchronous copy command available?

use crate::host::Host;

/// Whether `host` supports the synchronous `"copy"` command.
///
/// Logs a warning when it does not. Every mutating operation calls this
/// first and bails out before touching the document.
pub fn is_supported<H: Host>(host: &H) -> bool {
    let supported = host.supports_copy();
    if !supported {
        tracing::warn!(
            command = "copy",
            "this browser doesn't support functionality which is necessary for clipboard operations"
        );
    }
    supported
}

//! Clipboard writer — one payload through a scratch surface.
//!
//! The scratch surface is owned by a [`ScratchGuard`] so it is detached on
//! every exit path: success, any `?` return, and unwinding.

use crate::error::ClipboardError;
use crate::host::Host;

/// Payload written by `clear` and by `insert` of an absent or empty value.
///
/// The copy command silently does nothing for an empty selection, so
/// "empty" is represented by a NUL placeholder instead.
pub const EMPTY_SENTINEL: &str = "\0";

/// An attached scratch surface, detached on drop.
struct ScratchGuard<'h, H: Host> {
    host: &'h H,
    scratch: H::Scratch,
}

impl<'h, H: Host> ScratchGuard<'h, H> {
    fn attach(host: &'h H) -> Result<Self, ClipboardError> {
        let scratch = host.attach_scratch()?;
        Ok(Self { host, scratch })
    }
}

impl<H: Host> Drop for ScratchGuard<'_, H> {
    fn drop(&mut self) {
        self.host.detach_scratch(&self.scratch);
        tracing::trace!("scratch surface detached");
    }
}

/// Write `payload` to the clipboard through `host`.
pub fn write<H: Host>(host: &H, payload: &str) -> Result<(), ClipboardError> {
    let guard = ScratchGuard::attach(host)?;
    host.fill_and_select(&guard.scratch, payload)?;
    host.perform_copy()?;
    tracing::debug!(bytes = payload.len(), "clipboard written");
    Ok(())
}

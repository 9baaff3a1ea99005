//! domclip — copy, insert and clear the system clipboard through the
//! synchronous DOM copy command.
//!
//! The pipeline is: capability check → value resolver (copy only) →
//! clipboard writer. The writer puts the payload in an invisible scratch
//! textarea attached to the document root, selects it, runs the copy
//! command and always removes the textarea again.
//!
//! All environment access goes through [`host::Host`]. The browser host
//! lives in `host::web` (wasm32 only); [`host::memory`] provides an
//! in-memory document for native use and tests.

pub mod dispatch;
pub mod error;
pub mod host;
pub mod resolve;
pub mod support;
pub mod writer;

pub use dispatch::{Arg, Clipboard, Operation};
pub use error::ClipboardError;
pub use host::{Element, Host, HostError, WrappedCollection};
pub use resolve::{CopyOptions, SelectorInput};
pub use writer::EMPTY_SENTINEL;

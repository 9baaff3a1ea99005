//! Host abstraction — the document and clipboard command as a port.
//!
//! The pipeline never touches a DOM directly. Everything it needs from the
//! environment (selector queries, element inspection, the scratch surface
//! lifecycle and the synchronous copy command) goes through [`Host`], so
//! the same logic runs against the browser ([`web`]) and against the
//! in-memory document ([`memory`]).
//!
//! Hosts are single-threaded: no `Send`/`Sync` bound, every call completes
//! before returning.

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

/// Errors reported by host adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The selector query could not be parsed or evaluated.
    #[error("selector: {0}")]
    Selector(String),

    /// A DOM operation failed (missing root element, element creation,
    /// focus/selection).
    #[error("dom: {0}")]
    Dom(String),

    /// The copy command threw.
    #[error("copy command failed: {0}")]
    Command(String),

    /// The copy command returned without copying anything.
    #[error("copy command was rejected")]
    Rejected,
}

/// Read access to one node of the host document.
///
/// Usually an element, but any node with text content qualifies;
/// non-elements have no tag, no attributes and no control value.
pub trait Element {
    /// Upper-case tag name (`"INPUT"`, `"DIV"`, ...). Empty for nodes
    /// that are not elements, such as text nodes.
    fn tag_name(&self) -> String;

    /// Attribute value, or `None` when the attribute is not set.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Current editable value of an input-like control.
    fn control_value(&self) -> Option<String>;

    /// Rendered text content. `None` for nodes without text content.
    fn text_content(&self) -> Option<String>;

    /// Whether the element is an `INPUT` or `TEXTAREA` control.
    fn is_text_control(&self) -> bool {
        matches!(self.tag_name().to_ascii_uppercase().as_str(), "INPUT" | "TEXTAREA")
    }
}

/// A collection type owned by a third-party library that has to be
/// materialized into a plain list before use.
pub trait WrappedCollection<E> {
    fn materialize(&self) -> Vec<E>;
}

/// The document and clipboard command a [`crate::Clipboard`] runs against.
pub trait Host {
    type Element: Element;

    /// Scratch surface handle. Owned by the writer for one call only.
    type Scratch;

    /// Whether the host exposes the command-support query and that query
    /// affirms `"copy"`.
    fn supports_copy(&self) -> bool;

    /// All elements matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, HostError>;

    /// Create an invisible, zero-size text input and append it to the
    /// document root element. Remembers the currently focused element.
    fn attach_scratch(&self) -> Result<Self::Scratch, HostError>;

    /// Set the scratch value to `payload`, focus it and select all of it.
    ///
    /// Focus moves to the scratch surface until it is detached.
    fn fill_and_select(&self, scratch: &Self::Scratch, payload: &str) -> Result<(), HostError>;

    /// Run the synchronous copy command on the current selection.
    fn perform_copy(&self) -> Result<(), HostError>;

    /// Remove the scratch surface from the document and give focus back
    /// to the element that held it at attach time. Must not fail.
    fn detach_scratch(&self, scratch: &Self::Scratch);
}

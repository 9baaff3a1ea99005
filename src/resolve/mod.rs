//! Value resolver — selector input to an ordered list of text values.
//!
//! A selector is normalized to a list of elements, then each element is
//! reduced to one value:
//!
//! 1. the configured attribute, if set to a non-empty string;
//! 2. otherwise the editable value of an `INPUT`/`TEXTAREA`;
//! 3. otherwise the element's text content.
//!
//! Values that end up empty are dropped. An empty selection or an empty
//! value list is an error, never an empty success.

pub mod trim;

use std::fmt;

use crate::error::ClipboardError;
use crate::host::{Element, Host, HostError, WrappedCollection};

/// What to copy from.
pub enum SelectorInput<E> {
    /// A selector query, evaluated against the host document.
    Query(String),
    /// A third-party collection, materialized before use.
    Wrapped(Box<dyn WrappedCollection<E>>),
    /// A single element.
    Element(E),
    /// A native element collection.
    Collection(Vec<E>),
}

impl<E> SelectorInput<E> {
    pub fn query(selector: impl Into<String>) -> Self {
        Self::Query(selector.into())
    }

    pub fn element(element: E) -> Self {
        Self::Element(element)
    }

    pub fn collection(elements: impl IntoIterator<Item = E>) -> Self {
        Self::Collection(elements.into_iter().collect())
    }

    pub fn wrapped(collection: impl WrappedCollection<E> + 'static) -> Self {
        Self::Wrapped(Box::new(collection))
    }
}

impl<E> fmt::Debug for SelectorInput<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(q) => f.debug_tuple("Query").field(q).finish(),
            Self::Wrapped(_) => f.write_str("Wrapped(..)"),
            Self::Element(_) => f.write_str("Element(..)"),
            Self::Collection(c) => write!(f, "Collection(len={})", c.len()),
        }
    }
}

/// Per-call extraction policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Attribute preferred over the element's value or text.
    pub attribute: Option<String>,
    /// Strip leading/trailing whitespace from each value.
    pub trim: bool,
}

impl CopyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer `name` over the element's value or text. An empty name
    /// means no attribute.
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.attribute = (!name.is_empty()).then_some(name);
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

/// Normalize `selector` into a non-empty list of elements.
pub fn normalize<H: Host>(
    host: &H,
    selector: SelectorInput<H::Element>,
) -> Result<Vec<H::Element>, ClipboardError> {
    let elements = match selector {
        SelectorInput::Query(query) => host.query_selector_all(&query).map_err(|e| match e {
            HostError::Selector(reason) => ClipboardError::InvalidSelector(reason),
            other => ClipboardError::InvalidSelector(other.to_string()),
        })?,
        SelectorInput::Wrapped(collection) => collection.materialize(),
        SelectorInput::Element(element) => vec![element],
        SelectorInput::Collection(elements) => elements,
    };

    if elements.is_empty() {
        return Err(ClipboardError::EmptySelection);
    }
    Ok(elements)
}

/// Extract one element's value under `options`. `None` when it has none.
pub fn extract<E: Element>(element: &E, options: &CopyOptions) -> Option<String> {
    let from_attribute = options
        .attribute
        .as_deref()
        .and_then(|name| element.attribute(name))
        .filter(|v| !v.is_empty());

    let value = match from_attribute {
        Some(v) => Some(v),
        None if element.is_text_control() => element.control_value(),
        None => element.text_content(),
    }?;

    let value = if options.trim {
        trim::trim_edges(&value).into_owned()
    } else {
        value
    };
    (!value.is_empty()).then_some(value)
}

/// Resolve `selector` to the ordered, non-empty values of its elements.
pub fn resolve<H: Host>(
    host: &H,
    selector: SelectorInput<H::Element>,
    options: &CopyOptions,
) -> Result<Vec<String>, ClipboardError> {
    let elements = normalize(host, selector)?;
    let values: Vec<String> = elements
        .iter()
        .filter_map(|el| extract(el, options))
        .collect();

    tracing::trace!(
        elements = elements.len(),
        values = values.len(),
        "resolved selector values"
    );

    if values.is_empty() {
        return Err(ClipboardError::EmptySelection);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{MemoryDocument, MemoryElement};

    struct FakeWrapped(Vec<MemoryElement>);

    impl WrappedCollection<MemoryElement> for FakeWrapped {
        fn materialize(&self) -> Vec<MemoryElement> {
            self.0.clone()
        }
    }

    fn three_paragraphs(doc: &MemoryDocument) {
        doc.append(MemoryElement::new("p").text("a"));
        doc.append(MemoryElement::new("p").text(" b "));
        doc.append(MemoryElement::new("p").text(""));
    }

    #[test]
    fn trimmed_values_drop_empties() {
        let doc = MemoryDocument::new();
        three_paragraphs(&doc);
        let values = resolve(&doc, SelectorInput::query("p"), &CopyOptions::new().trim(true)).unwrap();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn untrimmed_values_keep_whitespace() {
        let doc = MemoryDocument::new();
        three_paragraphs(&doc);
        let values = resolve(&doc, SelectorInput::query("p"), &CopyOptions::new()).unwrap();
        assert_eq!(values, vec!["a", " b "]);
    }

    #[test]
    fn attribute_wins_over_value_and_text() {
        let doc = MemoryDocument::new();
        let input = MemoryElement::new("input")
            .attr("data-copy", "42")
            .value("typed")
            .text("text");
        let options = CopyOptions::new().attribute("data-copy");
        let values = resolve(&doc, SelectorInput::element(input), &options).unwrap();
        assert_eq!(values, vec!["42"]);
    }

    #[test]
    fn empty_or_missing_attribute_falls_back() {
        let input = MemoryElement::new("input").attr("data-copy", "").value("typed");
        let div = MemoryElement::new("div").text("shown");
        let options = CopyOptions::new().attribute("data-copy");
        assert_eq!(extract(&input, &options).as_deref(), Some("typed"));
        assert_eq!(extract(&div, &options).as_deref(), Some("shown"));
    }

    #[test]
    fn text_controls_use_their_value() {
        let area = MemoryElement::new("textarea").value("draft").text("initial");
        assert_eq!(extract(&area, &CopyOptions::new()).as_deref(), Some("draft"));
    }

    #[test]
    fn text_nodes_resolve_through_text_content() {
        let doc = MemoryDocument::new();
        let nodes = vec![
            MemoryElement::new("b").attr("data-copy", "bold"),
            MemoryElement::text_node("  loose text "),
        ];
        let options = CopyOptions::new().attribute("data-copy").trim(true);
        let values = resolve(&doc, SelectorInput::collection(nodes), &options).unwrap();
        assert_eq!(values, vec!["bold", "loose text"]);

        let lone = SelectorInput::element(MemoryElement::text_node("solo"));
        assert_eq!(resolve(&doc, lone, &CopyOptions::new()).unwrap(), vec!["solo"]);
    }

    #[test]
    fn missing_text_is_dropped() {
        let node = MemoryElement::new("div").without_text();
        assert_eq!(extract(&node, &CopyOptions::new().trim(true)), None);
    }

    #[test]
    fn whitespace_only_value_dropped_when_trimmed() {
        let node = MemoryElement::new("span").text("\u{A0} \u{FEFF}");
        assert_eq!(extract(&node, &CopyOptions::new().trim(true)), None);
        assert!(extract(&node, &CopyOptions::new()).is_some());
    }

    #[test]
    fn empty_attribute_name_means_none() {
        assert_eq!(CopyOptions::new().attribute("").attribute, None);
    }

    #[test]
    fn zero_matches_is_empty_selection() {
        let doc = MemoryDocument::new();
        three_paragraphs(&doc);
        let err = resolve(&doc, SelectorInput::query("span"), &CopyOptions::new()).unwrap_err();
        assert!(matches!(err, ClipboardError::EmptySelection));
    }

    #[test]
    fn all_empty_values_is_empty_selection() {
        let doc = MemoryDocument::new();
        let blanks = vec![MemoryElement::new("p"), MemoryElement::new("p").text("  ")];
        let err = resolve(
            &doc,
            SelectorInput::collection(blanks),
            &CopyOptions::new().trim(true),
        )
        .unwrap_err();
        assert!(matches!(err, ClipboardError::EmptySelection));
    }

    #[test]
    fn bad_query_is_invalid_selector() {
        let doc = MemoryDocument::new();
        let err = resolve(&doc, SelectorInput::query("div > p"), &CopyOptions::new()).unwrap_err();
        assert!(matches!(err, ClipboardError::InvalidSelector(_)));
    }

    #[test]
    fn wrapped_collection_is_materialized_in_order() {
        let doc = MemoryDocument::new();
        let wrapped = FakeWrapped(vec![
            MemoryElement::new("li").text("one"),
            MemoryElement::new("li").text("two"),
        ]);
        let values = resolve(&doc, SelectorInput::wrapped(wrapped), &CopyOptions::new()).unwrap();
        assert_eq!(values, vec!["one", "two"]);
    }

    #[test]
    fn empty_collection_is_empty_selection() {
        let doc = MemoryDocument::new();
        let err = normalize(&doc, SelectorInput::collection(Vec::new())).unwrap_err();
        assert!(matches!(err, ClipboardError::EmptySelection));
    }
}

//! In-memory host — a flat document with an in-memory clipboard.
//!
//! Elements live in a single body list in document order. The document
//! root element only ever holds scratch surfaces, which makes leftover
//! scratch elements easy to observe. The copy command's support and its
//! outcome, and faults while preparing the scratch surface, are
//! programmable so failure paths can be driven on demand. Focus is
//! tracked so its hand-off to and from the scratch surface is visible.

use std::cell::{Cell, RefCell};
use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;

use super::{Element, Host, HostError};

/// Inline style applied to every scratch surface.
const SCRATCH_STYLE: &str = "opacity: 0; width: 0; height: 0;";

#[derive(Debug, Default)]
struct ElementData {
    /// Upper-case tag name. Empty for text nodes.
    tag: String,
    attributes: Vec<(String, String)>,
    value: Option<String>,
    text: Option<String>,
}

/// Shared handle to an element of a [`MemoryDocument`].
///
/// Clones refer to the same element, like DOM node references.
#[derive(Debug, Clone)]
pub struct MemoryElement(Rc<RefCell<ElementData>>);

impl MemoryElement {
    /// Create an element with empty text content.
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            tag: tag.to_ascii_uppercase(),
            text: Some(String::new()),
            ..ElementData::default()
        })))
    }

    /// Create a text node: no tag, no attributes, only text content.
    pub fn text_node(text: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            text: Some(text.to_string()),
            ..ElementData::default()
        })))
    }

    /// Set the text content.
    pub fn text(self, text: &str) -> Self {
        self.0.borrow_mut().text = Some(text.to_string());
        self
    }

    /// Drop the text content entirely, as for nodes that have none.
    pub fn without_text(self) -> Self {
        self.0.borrow_mut().text = None;
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn attr(self, name: &str, value: &str) -> Self {
        {
            let mut data = self.0.borrow_mut();
            data.attributes.retain(|(n, _)| n != name);
            data.attributes.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Set the editable value (only read for `INPUT`/`TEXTAREA`).
    pub fn value(self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn set_value(&self, value: &str) {
        self.0.borrow_mut().value = Some(value.to_string());
    }

    /// Whether both handles refer to the same element.
    pub fn same_node(&self, other: &MemoryElement) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Element for MemoryElement {
    fn tag_name(&self) -> String {
        self.0.borrow().tag.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn control_value(&self) -> Option<String> {
        if !self.is_text_control() {
            return None;
        }
        Some(self.0.borrow().value.clone().unwrap_or_default())
    }

    fn text_content(&self) -> Option<String> {
        self.0.borrow().text.clone()
    }
}

/// Outcome of the copy command on a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyOutcome {
    /// The selection lands on the clipboard.
    #[default]
    Succeed,
    /// The command throws.
    Throw,
    /// The command returns without copying.
    Reject,
}

/// Fault injected while preparing a scratch surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScratchFault {
    #[default]
    None,
    /// Appending the surface to the root element fails.
    Attach,
    /// Filling, focusing or selecting the surface fails.
    Select,
}

/// A scratch surface attached by [`MemoryDocument`].
#[derive(Debug)]
pub struct MemoryScratch {
    element: MemoryElement,
    /// Focus to restore on detach.
    previous_focus: Option<MemoryElement>,
}

impl MemoryScratch {
    pub fn element(&self) -> &MemoryElement {
        &self.element
    }
}

/// In-memory document and clipboard.
#[derive(Debug)]
pub struct MemoryDocument {
    body: RefCell<Vec<MemoryElement>>,
    /// Children of the document root element (scratch surfaces only).
    root_children: RefCell<Vec<MemoryElement>>,
    selection: RefCell<Option<String>>,
    clipboard: RefCell<Option<String>>,
    copy_supported: Cell<bool>,
    copy_outcome: Cell<CopyOutcome>,
    scratch_fault: Cell<ScratchFault>,
    focused: RefCell<Option<MemoryElement>>,
    copies: Cell<usize>,
    scratch_attachments: Cell<usize>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty document that supports the copy command.
    pub fn new() -> Self {
        Self {
            body: RefCell::new(Vec::new()),
            root_children: RefCell::new(Vec::new()),
            selection: RefCell::new(None),
            clipboard: RefCell::new(None),
            copy_supported: Cell::new(true),
            copy_outcome: Cell::new(CopyOutcome::Succeed),
            scratch_fault: Cell::new(ScratchFault::None),
            focused: RefCell::new(None),
            copies: Cell::new(0),
            scratch_attachments: Cell::new(0),
        }
    }

    /// An empty document whose environment lacks the copy command.
    pub fn unsupported() -> Self {
        let doc = Self::new();
        doc.set_copy_supported(false);
        doc
    }

    /// Append an element to the body and return its handle.
    pub fn append(&self, element: MemoryElement) -> MemoryElement {
        self.body.borrow_mut().push(element.clone());
        element
    }

    pub fn set_copy_supported(&self, supported: bool) {
        self.copy_supported.set(supported);
    }

    pub fn set_copy_outcome(&self, outcome: CopyOutcome) {
        self.copy_outcome.set(outcome);
    }

    pub fn set_scratch_fault(&self, fault: ScratchFault) {
        self.scratch_fault.set(fault);
    }

    /// Give `element` the focus.
    pub fn focus(&self, element: &MemoryElement) {
        *self.focused.borrow_mut() = Some(element.clone());
    }

    /// The focused element, if any.
    pub fn focused(&self) -> Option<MemoryElement> {
        self.focused.borrow().clone()
    }

    /// Current clipboard content. `None` until the first successful copy.
    pub fn clipboard(&self) -> Option<String> {
        self.clipboard.borrow().clone()
    }

    /// Number of copy commands that reached the clipboard.
    pub fn copy_count(&self) -> usize {
        self.copies.get()
    }

    /// Number of scratch surfaces ever attached.
    pub fn scratch_attachments(&self) -> usize {
        self.scratch_attachments.get()
    }

    /// Elements currently attached to the document root element.
    pub fn root_children(&self) -> Vec<MemoryElement> {
        self.root_children.borrow().clone()
    }
}

impl Host for MemoryDocument {
    type Element = MemoryElement;
    type Scratch = MemoryScratch;

    fn supports_copy(&self) -> bool {
        self.copy_supported.get()
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<MemoryElement>, HostError> {
        let groups = parse_selector(selector)?;
        Ok(self
            .body
            .borrow()
            .iter()
            .filter(|el| {
                let data = el.0.borrow();
                groups.iter().any(|g| g.matches(&data))
            })
            .cloned()
            .collect())
    }

    fn attach_scratch(&self) -> Result<MemoryScratch, HostError> {
        if self.scratch_fault.get() == ScratchFault::Attach {
            return Err(HostError::Dom("cannot append scratch surface".into()));
        }

        let element = MemoryElement::new("textarea").attr("style", SCRATCH_STYLE);
        self.root_children.borrow_mut().push(element.clone());
        self.scratch_attachments.set(self.scratch_attachments.get() + 1);
        Ok(MemoryScratch {
            element,
            previous_focus: self.focused(),
        })
    }

    fn fill_and_select(&self, scratch: &MemoryScratch, payload: &str) -> Result<(), HostError> {
        let attached = self
            .root_children
            .borrow()
            .iter()
            .any(|c| c.same_node(&scratch.element));
        if !attached {
            return Err(HostError::Dom("scratch surface is not attached".into()));
        }
        if self.scratch_fault.get() == ScratchFault::Select {
            return Err(HostError::Dom("cannot select scratch surface".into()));
        }

        scratch.element.set_value(payload);
        self.focus(&scratch.element);
        *self.selection.borrow_mut() = Some(payload.to_string());
        Ok(())
    }

    fn perform_copy(&self) -> Result<(), HostError> {
        match self.copy_outcome.get() {
            CopyOutcome::Throw => Err(HostError::Command("copy command threw".into())),
            CopyOutcome::Reject => Err(HostError::Rejected),
            CopyOutcome::Succeed => {
                let selected = self.selection.borrow().clone().ok_or(HostError::Rejected)?;
                *self.clipboard.borrow_mut() = Some(selected);
                self.copies.set(self.copies.get() + 1);
                Ok(())
            }
        }
    }

    fn detach_scratch(&self, scratch: &MemoryScratch) {
        self.root_children
            .borrow_mut()
            .retain(|c| !c.same_node(&scratch.element));
        // Removing the selected element drops the selection.
        self.selection.borrow_mut().take();
        *self.focused.borrow_mut() = scratch.previous_focus.clone();
    }
}

/// One compound selector: `tag#id.class[attr=value]`.
#[derive(Debug, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, el: &ElementData) -> bool {
        if el.tag.is_empty() {
            return false;
        }
        let attr = |name: &str| {
            el.attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };

        if let Some(tag) = &self.tag
            && *tag != el.tag
        {
            return false;
        }
        if let Some(id) = &self.id
            && attr("id") != Some(id.as_str())
        {
            return false;
        }
        let class_list = attr("class").unwrap_or_default();
        if !self
            .classes
            .iter()
            .all(|c| class_list.split_whitespace().any(|have| have == c))
        {
            return false;
        }
        self.attributes
            .iter()
            .all(|(name, expected)| match (attr(name.as_str()), expected) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected.as_str(),
            })
    }
}

/// Parse a comma-separated list of compound selectors.
///
/// Supports type (`div`, `*`), id, class and attribute (`[a]`, `[a=v]`,
/// `[a="v"]`) selectors. Combinators are rejected.
fn parse_selector(input: &str) -> Result<Vec<Compound>, HostError> {
    input
        .split(',')
        .map(|group| {
            let group = group.trim();
            if group.is_empty() {
                return Err(HostError::Selector(format!("empty selector in {input:?}")));
            }
            parse_compound(group)
        })
        .collect()
}

fn parse_compound(src: &str) -> Result<Compound, HostError> {
    let mut compound = Compound::default();
    let mut chars = src.chars().peekable();

    if chars.peek() == Some(&'*') {
        chars.next();
    } else {
        let tag = take_ident(&mut chars);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_uppercase());
        }
    }

    while let Some(c) = chars.next() {
        match c {
            '#' => compound.id = Some(require_ident(&mut chars, src)?),
            '.' => compound.classes.push(require_ident(&mut chars, src)?),
            '[' => {
                let name = require_ident(&mut chars, src)?;
                match chars.next() {
                    Some(']') => compound.attributes.push((name, None)),
                    Some('=') => {
                        let value = take_attr_value(&mut chars, src)?;
                        if chars.next() != Some(']') {
                            return Err(HostError::Selector(format!(
                                "unterminated attribute selector in {src:?}"
                            )));
                        }
                        compound.attributes.push((name, Some(value)));
                    }
                    _ => {
                        return Err(HostError::Selector(format!(
                            "malformed attribute selector in {src:?}"
                        )));
                    }
                }
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                return Err(HostError::Selector(format!(
                    "combinators are not supported: {src:?}"
                )));
            }
            other => {
                return Err(HostError::Selector(format!(
                    "unexpected {other:?} in {src:?}"
                )));
            }
        }
    }

    Ok(compound)
}

fn take_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !(c.is_alphanumeric() || c == '-' || c == '_') {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

fn require_ident(chars: &mut Peekable<Chars<'_>>, src: &str) -> Result<String, HostError> {
    let ident = take_ident(chars);
    if ident.is_empty() {
        return Err(HostError::Selector(format!("expected a name in {src:?}")));
    }
    Ok(ident)
}

fn take_attr_value(chars: &mut Peekable<Chars<'_>>, src: &str) -> Result<String, HostError> {
    let quote = match chars.peek() {
        Some(&q) if q == '"' || q == '\'' => q,
        _ => return Ok(take_ident(chars)),
    };
    chars.next();

    let mut value = String::new();
    for c in chars.by_ref() {
        if c == quote {
            return Ok(value);
        }
        value.push(c);
    }
    Err(HostError::Selector(format!("unterminated string in {src:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> MemoryDocument {
        let doc = MemoryDocument::new();
        doc.append(MemoryElement::new("p").attr("class", "note first").text("a"));
        doc.append(MemoryElement::new("input").attr("id", "answer").attr("data-copy", "42"));
        doc.append(MemoryElement::new("p").attr("class", "note").text("b"));
        doc.append(MemoryElement::new("span").attr("data-kind", "x y").text("c"));
        doc
    }

    fn texts(elements: &[MemoryElement]) -> Vec<String> {
        elements.iter().map(|e| e.text_content().unwrap()).collect()
    }

    #[test]
    fn query_by_tag_keeps_document_order() {
        let doc = sample_document();
        let found = doc.query_selector_all("p").unwrap();
        assert_eq!(texts(&found), vec!["a", "b"]);
    }

    #[test]
    fn query_by_class_and_compound() {
        let doc = sample_document();
        assert_eq!(doc.query_selector_all(".note").unwrap().len(), 2);
        assert_eq!(texts(&doc.query_selector_all("p.note.first").unwrap()), vec!["a"]);
        assert!(doc.query_selector_all("span.note").unwrap().is_empty());
    }

    #[test]
    fn query_by_id_and_attribute() {
        let doc = sample_document();
        let found = doc.query_selector_all("#answer").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag_name(), "INPUT");

        assert_eq!(doc.query_selector_all("[data-copy]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[data-copy=42]").unwrap().len(), 1);
        assert!(doc.query_selector_all("[data-copy=41]").unwrap().is_empty());
        assert_eq!(doc.query_selector_all("[data-kind=\"x y\"]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[data-kind='x y']").unwrap().len(), 1);
    }

    #[test]
    fn query_group_unions_in_document_order() {
        let doc = sample_document();
        let found = doc.query_selector_all("span, p.first").unwrap();
        assert_eq!(texts(&found), vec!["a", "c"]);
    }

    #[test]
    fn query_universal_matches_everything() {
        let doc = sample_document();
        assert_eq!(doc.query_selector_all("*").unwrap().len(), 4);
    }

    #[test]
    fn query_rejects_malformed_selectors() {
        let doc = sample_document();
        for bad in ["", "p,", "div p", "p > span", "#", "[data", "[a=\"x]", "p!"] {
            assert!(
                matches!(doc.query_selector_all(bad), Err(HostError::Selector(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn control_value_only_for_text_controls() {
        let input = MemoryElement::new("input").value("typed");
        let area = MemoryElement::new("TEXTAREA");
        let div = MemoryElement::new("div").value("ignored");
        assert_eq!(input.control_value().as_deref(), Some("typed"));
        assert_eq!(area.control_value().as_deref(), Some(""));
        assert_eq!(div.control_value(), None);
    }

    #[test]
    fn scratch_lifecycle_copies_selection() {
        let doc = MemoryDocument::new();
        let scratch = doc.attach_scratch().unwrap();
        assert_eq!(doc.root_children().len(), 1);
        assert_eq!(
            scratch.element().attribute("style").as_deref(),
            Some(SCRATCH_STYLE)
        );

        doc.fill_and_select(&scratch, "payload").unwrap();
        doc.perform_copy().unwrap();
        doc.detach_scratch(&scratch);

        assert!(doc.root_children().is_empty());
        assert_eq!(doc.clipboard().as_deref(), Some("payload"));
        assert_eq!(doc.copy_count(), 1);
    }

    #[test]
    fn copy_without_selection_is_rejected() {
        let doc = MemoryDocument::new();
        assert_eq!(doc.perform_copy(), Err(HostError::Rejected));
        assert_eq!(doc.clipboard(), None);
    }

    #[test]
    fn programmed_outcomes_fail_the_copy() {
        let doc = MemoryDocument::new();
        let scratch = doc.attach_scratch().unwrap();
        doc.fill_and_select(&scratch, "x").unwrap();

        doc.set_copy_outcome(CopyOutcome::Throw);
        assert!(matches!(doc.perform_copy(), Err(HostError::Command(_))));
        doc.set_copy_outcome(CopyOutcome::Reject);
        assert_eq!(doc.perform_copy(), Err(HostError::Rejected));
        assert_eq!(doc.copy_count(), 0);
    }

    #[test]
    fn fill_requires_attached_scratch() {
        let doc = MemoryDocument::new();
        let scratch = doc.attach_scratch().unwrap();
        doc.detach_scratch(&scratch);
        assert!(matches!(
            doc.fill_and_select(&scratch, "x"),
            Err(HostError::Dom(_))
        ));
    }

    #[test]
    fn text_nodes_have_text_but_no_tag() {
        let node = MemoryElement::text_node(" loose ");
        assert_eq!(node.tag_name(), "");
        assert!(!node.is_text_control());
        assert_eq!(node.attribute("id"), None);
        assert_eq!(node.control_value(), None);
        assert_eq!(node.text_content().as_deref(), Some(" loose "));
    }

    #[test]
    fn selectors_never_match_text_nodes() {
        let doc = MemoryDocument::new();
        doc.append(MemoryElement::text_node("loose"));
        doc.append(MemoryElement::new("p").text("para"));
        assert_eq!(texts(&doc.query_selector_all("*").unwrap()), vec!["para"]);
    }

    #[test]
    fn attach_fault_leaves_root_untouched() {
        let doc = MemoryDocument::new();
        doc.set_scratch_fault(ScratchFault::Attach);
        assert!(matches!(doc.attach_scratch(), Err(HostError::Dom(_))));
        assert!(doc.root_children().is_empty());
        assert_eq!(doc.scratch_attachments(), 0);
    }

    #[test]
    fn select_fault_fails_after_attach() {
        let doc = MemoryDocument::new();
        doc.set_scratch_fault(ScratchFault::Select);
        let scratch = doc.attach_scratch().unwrap();
        assert!(matches!(
            doc.fill_and_select(&scratch, "x"),
            Err(HostError::Dom(_))
        ));
        assert_eq!(doc.root_children().len(), 1);
        doc.detach_scratch(&scratch);
        assert!(doc.root_children().is_empty());
    }

    #[test]
    fn focus_returns_to_previous_element_on_detach() {
        let doc = MemoryDocument::new();
        let input = doc.append(MemoryElement::new("input"));
        doc.focus(&input);

        let scratch = doc.attach_scratch().unwrap();
        doc.fill_and_select(&scratch, "x").unwrap();
        assert!(doc.focused().unwrap().same_node(scratch.element()));

        doc.detach_scratch(&scratch);
        assert!(doc.focused().unwrap().same_node(&input));
    }
}

//! Browser host over `web-sys`, and the script-facing exports.
//!
//! The scratch surface is a `<textarea>` styled to be invisible and
//! zero-size, appended to `<html>`. The copy command is
//! `document.execCommand("copy")`; a `false` return counts as rejected.
//! Whatever held focus before the surface was attached gets it back on
//! detach.
//!
//! Selections are nodes, not just elements: a collection holding text
//! nodes copies their text content.
//!
//! Exports: `clipboard(mixed, a, b, c)` (throws on an unknown operation
//! name), `copy`, `insert`, `clear` and `isSupported`.

use std::io;

use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCollection, HtmlDocument, HtmlElement, HtmlTextAreaElement, Node, NodeList};

use super::{Element, Host, HostError, WrappedCollection};
use crate::dispatch::{Arg, Clipboard, Operation};

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// The current page's document.
pub struct WebHost {
    document: Document,
}

impl WebHost {
    pub fn new() -> Result<Self, HostError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| HostError::Dom("no window document".into()))?;
        Ok(Self { document })
    }

    fn html_document(&self) -> Option<&HtmlDocument> {
        self.document.dyn_ref::<HtmlDocument>()
    }
}

/// The attached `<textarea>` and the element focused before it.
pub struct WebScratch {
    area: HtmlTextAreaElement,
    previous_focus: Option<HtmlElement>,
}

impl Element for Node {
    fn tag_name(&self) -> String {
        self.dyn_ref::<web_sys::Element>()
            .map(|el| el.tag_name())
            .unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.dyn_ref::<web_sys::Element>()?.get_attribute(name)
    }

    fn control_value(&self) -> Option<String> {
        if let Some(input) = self.dyn_ref::<web_sys::HtmlInputElement>() {
            return Some(input.value());
        }
        self.dyn_ref::<HtmlTextAreaElement>().map(|area| area.value())
    }

    fn text_content(&self) -> Option<String> {
        Node::text_content(self)
    }
}

impl Host for WebHost {
    type Element = Node;
    type Scratch = WebScratch;

    fn supports_copy(&self) -> bool {
        let has_query = js_sys::Reflect::get(&self.document, &"queryCommandSupported".into())
            .map(|f| f.is_function())
            .unwrap_or(false);
        if !has_query {
            return false;
        }
        self.html_document()
            .and_then(|doc| doc.query_command_supported("copy").ok())
            .unwrap_or(false)
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>, HostError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| HostError::Selector(describe(&e)))?;
        Ok(node_list_nodes(&list))
    }

    fn attach_scratch(&self) -> Result<WebScratch, HostError> {
        let root = self
            .document
            .document_element()
            .ok_or_else(|| HostError::Dom("document has no root element".into()))?;

        let area = self
            .document
            .create_element("textarea")
            .map_err(|e| HostError::Dom(describe(&e)))?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| HostError::Dom("created element is not a textarea".into()))?;

        let style = area.style();
        for (property, value) in [("opacity", "0"), ("width", "0"), ("height", "0")] {
            style
                .set_property(property, value)
                .map_err(|e| HostError::Dom(describe(&e)))?;
        }

        let previous_focus = self
            .document
            .active_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        root.append_child(&area)
            .map_err(|e| HostError::Dom(describe(&e)))?;
        Ok(WebScratch {
            area,
            previous_focus,
        })
    }

    fn fill_and_select(&self, scratch: &WebScratch, payload: &str) -> Result<(), HostError> {
        scratch.area.set_value(payload);
        scratch
            .area
            .focus()
            .map_err(|e| HostError::Dom(describe(&e)))?;
        scratch.area.select();
        Ok(())
    }

    fn perform_copy(&self) -> Result<(), HostError> {
        let doc = self
            .html_document()
            .ok_or_else(|| HostError::Command("document is not an HTML document".into()))?;
        match doc.exec_command("copy") {
            Ok(true) => Ok(()),
            Ok(false) => Err(HostError::Rejected),
            Err(e) => Err(HostError::Command(describe(&e))),
        }
    }

    fn detach_scratch(&self, scratch: &WebScratch) {
        scratch.area.remove();
        if let Some(previous) = &scratch.previous_focus
            && let Err(e) = previous.focus()
        {
            tracing::debug!(error = %describe(&e), "could not restore focus");
        }
    }
}

fn node_list_nodes(list: &NodeList) -> Vec<Node> {
    (0..list.length()).filter_map(|i| list.item(i)).collect()
}

fn html_collection_nodes(collection: &HtmlCollection) -> Vec<Node> {
    (0..collection.length())
        .filter_map(|i| collection.item(i))
        .map(Node::from)
        .collect()
}

/// A jQuery object, materialized with `jQuery.makeArray`.
struct JQueryCollection {
    jquery: js_sys::Function,
    object: JsValue,
}

impl JQueryCollection {
    /// Recognize `value` as a jQuery object when the page has loaded
    /// jQuery and `value` carries the `jquery` version property.
    fn detect(value: &JsValue) -> Option<Self> {
        let window = web_sys::window()?;
        let jquery = js_sys::Reflect::get(&window, &"jQuery".into())
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()?;
        let version = js_sys::Reflect::get(value, &"jquery".into()).ok()?;
        version.is_string().then(|| Self {
            jquery,
            object: value.clone(),
        })
    }
}

impl WrappedCollection<Node> for JQueryCollection {
    fn materialize(&self) -> Vec<Node> {
        let make_array = js_sys::Reflect::get(&self.jquery, &"makeArray".into())
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        let Some(make_array) = make_array else {
            tracing::warn!("jQuery.makeArray is not available");
            return Vec::new();
        };

        match make_array.call1(&self.jquery, &self.object) {
            Ok(array) => js_sys::Array::from(&array)
                .iter()
                .filter_map(|v| v.dyn_into::<Node>().ok())
                .collect(),
            Err(e) => {
                tracing::warn!(error = %describe(&e), "jQuery.makeArray failed");
                Vec::new()
            }
        }
    }
}

/// Classify a script value as a dispatcher argument.
fn to_arg(value: JsValue) -> Arg<Node> {
    if value.is_undefined() {
        return Arg::Absent;
    }
    if value.is_null() {
        return Arg::Null;
    }
    if let Some(b) = value.as_bool() {
        return Arg::Bool(b);
    }
    if let Some(n) = value.as_f64() {
        return Arg::Number(n);
    }
    if let Some(s) = value.as_string() {
        return Arg::Str(s);
    }
    if let Some(collection) = JQueryCollection::detect(&value) {
        return Arg::Wrapped(Box::new(collection));
    }
    if let Some(list) = value.dyn_ref::<NodeList>() {
        return Arg::Collection(node_list_nodes(list));
    }
    if let Some(collection) = value.dyn_ref::<HtmlCollection>() {
        return Arg::Collection(html_collection_nodes(collection));
    }
    match value.dyn_into::<Node>() {
        Ok(node) => Arg::Element(node),
        Err(_) => Arg::Object,
    }
}

fn page_clipboard() -> Option<Clipboard<WebHost>> {
    match WebHost::new() {
        Ok(host) => Some(Clipboard::new(host)),
        Err(e) => {
            tracing::error!(error = %e, "clipboard unavailable");
            None
        }
    }
}

fn run(operation: Operation, args: Vec<JsValue>) -> bool {
    page_clipboard()
        .map(|cb| cb.run(operation, args.into_iter().map(to_arg)))
        .unwrap_or(false)
}

/// `clipboard(mixed, ...)`: dispatch by operation name, defaulting to copy.
#[wasm_bindgen(js_name = clipboard)]
pub fn clipboard_js(mixed: JsValue, a: JsValue, b: JsValue, c: JsValue) -> Result<bool, JsError> {
    let Some(cb) = page_clipboard() else {
        return Ok(false);
    };
    let args = [mixed, a, b, c].into_iter().map(to_arg).collect();
    cb.invoke(args).map_err(|e| JsError::new(&e.to_string()))
}

#[wasm_bindgen]
pub fn copy(selector: JsValue, attribute_or_trim: JsValue, trim: JsValue) -> bool {
    run(Operation::Copy, vec![selector, attribute_or_trim, trim])
}

#[wasm_bindgen]
pub fn insert(value: JsValue) -> bool {
    run(Operation::Insert, vec![value])
}

#[wasm_bindgen]
pub fn clear() -> bool {
    run(Operation::Clear, Vec::new())
}

#[wasm_bindgen(js_name = isSupported)]
pub fn is_supported() -> bool {
    run(Operation::IsSupported, Vec::new())
}

/// Writer that forwards one formatted event to the browser console.
pub struct ConsoleWriter {
    level: tracing::Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = JsValue::from_str(line.trim_end());
        if self.level == tracing::Level::ERROR {
            web_sys::console::error_1(&line);
        } else if self.level == tracing::Level::WARN {
            web_sys::console::warn_1(&line);
        } else {
            web_sys::console::log_1(&line);
        }
    }
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> ConsoleWriter {
        ConsoleWriter {
            level: tracing::Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> ConsoleWriter {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

/// `installConsoleLogging(verbose)`: warnings and errors, or everything
/// from debug up when `verbose`.
#[wasm_bindgen(js_name = installConsoleLogging)]
pub fn install_console_logging_js(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    install_console_logging(level);
}

/// Route `tracing` events at or above `max_level` to the browser console.
///
/// Later calls are ignored once a subscriber is installed.
pub fn install_console_logging(max_level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .without_time()
        .with_ansi(false)
        .with_max_level(max_level)
        .try_init();
}

//! Dispatcher — the public clipboard operations.
//!
//! [`Clipboard`] exposes `copy`, `insert`, `clear` and `is_supported` over
//! a [`Host`], plus [`Clipboard::invoke`], which routes a loosely typed
//! argument list by operation name and defaults to `copy`.
//!
//! The bool-returning operations log and swallow every error. Each has a
//! `try_*` twin for callers that want the reason.

pub mod args;

use std::str::FromStr;

use crate::error::ClipboardError;
use crate::host::Host;
use crate::support;
use crate::resolve::{self, CopyOptions, SelectorInput};
use crate::writer::{self, EMPTY_SENTINEL};

pub use args::Arg;

/// A named clipboard operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Copy,
    Insert,
    Clear,
    IsSupported,
}

impl Operation {
    /// The name callers use to select the operation.
    pub fn name(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Insert => "insert",
            Self::Clear => "clear",
            Self::IsSupported => "isSupported",
        }
    }
}

impl FromStr for Operation {
    type Err = ClipboardError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "copy" => Ok(Self::Copy),
            "insert" => Ok(Self::Insert),
            "clear" => Ok(Self::Clear),
            "isSupported" => Ok(Self::IsSupported),
            other => Err(ClipboardError::UnknownOperation(other.to_string())),
        }
    }
}

/// Clipboard operations over a host document.
///
/// Stateless apart from the host handle; every call attaches and removes
/// its own scratch surface.
#[derive(Debug)]
pub struct Clipboard<H> {
    host: H,
}

impl<H: Host> Clipboard<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether the host supports the synchronous copy command.
    pub fn is_supported(&self) -> bool {
        support::is_supported(&self.host)
    }

    /// Copy the values of the elements `selector` resolves to, joined by
    /// newlines.
    pub fn copy(&self, selector: SelectorInput<H::Element>, options: &CopyOptions) -> bool {
        report(Operation::Copy, self.try_copy(selector, options))
    }

    pub fn try_copy(
        &self,
        selector: SelectorInput<H::Element>,
        options: &CopyOptions,
    ) -> Result<(), ClipboardError> {
        self.ensure_supported()?;
        self.copy_resolved(selector, options)
    }

    /// Put `text` on the clipboard. `None` or `""` writes [`EMPTY_SENTINEL`].
    pub fn insert(&self, text: Option<&str>) -> bool {
        report(Operation::Insert, self.try_insert(text))
    }

    pub fn try_insert(&self, text: Option<&str>) -> Result<(), ClipboardError> {
        self.ensure_supported()?;
        let payload = match text {
            None | Some("") => EMPTY_SENTINEL,
            Some(text) => text,
        };
        writer::write(&self.host, payload)
    }

    /// Put a loosely typed value on the clipboard after string coercion.
    pub fn insert_value(&self, value: Arg<H::Element>) -> bool {
        report(Operation::Insert, self.try_insert_value(value))
    }

    pub fn try_insert_value(&self, value: Arg<H::Element>) -> Result<(), ClipboardError> {
        self.ensure_supported()?;
        let payload = value.into_payload()?;
        writer::write(&self.host, &payload)
    }

    /// Replace the clipboard content with [`EMPTY_SENTINEL`].
    pub fn clear(&self) -> bool {
        report(Operation::Clear, self.try_clear())
    }

    pub fn try_clear(&self) -> Result<(), ClipboardError> {
        self.ensure_supported()?;
        writer::write(&self.host, EMPTY_SENTINEL)
    }

    /// Route `args` by operation name.
    ///
    /// A non-empty string first argument must name an operation, which
    /// then receives the remaining arguments. Any other first argument
    /// (absent, `null`, `""`, elements, objects, ...) selects `copy` with
    /// all arguments. Only [`ClipboardError::UnknownOperation`] is
    /// returned as an error.
    pub fn invoke(&self, args: Vec<Arg<H::Element>>) -> Result<bool, ClipboardError> {
        let mut args = args.into_iter();
        let first = args.next().unwrap_or(Arg::Absent);

        if let Arg::Str(name) = &first
            && !name.is_empty()
        {
            let operation = name.parse::<Operation>().inspect_err(|e| {
                tracing::error!(error = %e, "clipboard called with unknown operation");
            })?;
            return Ok(self.run(operation, args));
        }

        Ok(self.copy_positional(first, args))
    }

    /// Run `operation` with positional arguments.
    pub fn run(
        &self,
        operation: Operation,
        args: impl IntoIterator<Item = Arg<H::Element>>,
    ) -> bool {
        let mut args = args.into_iter();
        match operation {
            Operation::Copy => {
                let selector = args.next().unwrap_or(Arg::Absent);
                self.copy_positional(selector, args)
            }
            Operation::Insert => self.insert_value(args.next().unwrap_or(Arg::Absent)),
            Operation::Clear => self.clear(),
            Operation::IsSupported => self.is_supported(),
        }
    }

    fn copy_positional(
        &self,
        selector: Arg<H::Element>,
        mut rest: impl Iterator<Item = Arg<H::Element>>,
    ) -> bool {
        let second = rest.next().unwrap_or(Arg::Absent);
        let third = rest.next().unwrap_or(Arg::Absent);
        let result = self.ensure_supported().and_then(|()| {
            let options = args::copy_options(&second, &third);
            let selector = selector.into_selector()?;
            self.copy_resolved(selector, &options)
        });
        report(Operation::Copy, result)
    }

    fn copy_resolved(
        &self,
        selector: SelectorInput<H::Element>,
        options: &CopyOptions,
    ) -> Result<(), ClipboardError> {
        let values = resolve::resolve(&self.host, selector, options)?;
        writer::write(&self.host, &values.join("\n"))
    }

    fn ensure_supported(&self) -> Result<(), ClipboardError> {
        if support::is_supported(&self.host) {
            Ok(())
        } else {
            Err(ClipboardError::Unsupported)
        }
    }
}

/// Log a failed operation and flatten the result to a bool.
fn report(operation: Operation, result: Result<(), ClipboardError>) -> bool {
    let operation = operation.name();
    match result {
        Ok(()) => true,
        // The support check has already warned.
        Err(ClipboardError::Unsupported) => false,
        Err(e @ ClipboardError::WriteFailure(_)) => {
            tracing::error!(operation, error = %e, "unable to {operation}");
            false
        }
        Err(e) => {
            tracing::debug!(operation, error = %e, "clipboard operation skipped");
            false
        }
    }
}

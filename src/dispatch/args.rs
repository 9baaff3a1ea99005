//! Loosely typed arguments for the generic `invoke` surface.
//!
//! Mirrors what a script caller can pass: nothing, `null`, primitives,
//! elements, collections or arbitrary objects. The positional overload of
//! `copy` (second argument is the attribute name or the trim flag) is
//! resolved here into a typed [`CopyOptions`].

use std::fmt;

use crate::error::ClipboardError;
use crate::host::WrappedCollection;
use crate::resolve::{CopyOptions, SelectorInput};
use crate::writer::EMPTY_SENTINEL;

/// One positional argument.
pub enum Arg<E> {
    /// The argument was not passed.
    Absent,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Element(E),
    Collection(Vec<E>),
    Wrapped(Box<dyn WrappedCollection<E>>),
    /// Any other object.
    Object,
}

impl<E> Arg<E> {
    /// Type name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Element(_) => "element",
            Self::Collection(_) => "collection",
            Self::Wrapped(_) => "wrapped collection",
            Self::Object => "object",
        }
    }

    /// Script truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Absent | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::Element(_) | Self::Collection(_) | Self::Wrapped(_) | Self::Object => true,
        }
    }

    /// Interpret the argument as a selector input.
    pub fn into_selector(self) -> Result<SelectorInput<E>, ClipboardError> {
        match self {
            Self::Str(query) => Ok(SelectorInput::Query(query)),
            Self::Wrapped(collection) => Ok(SelectorInput::Wrapped(collection)),
            Self::Element(element) => Ok(SelectorInput::Element(element)),
            Self::Collection(elements) => Ok(SelectorInput::Collection(elements)),
            other => Err(ClipboardError::InvalidSelector(format!(
                "unsupported selector type: {}",
                other.kind()
            ))),
        }
    }

    /// Coerce the argument to an insert payload.
    ///
    /// Absent, `null` and empty strings become [`EMPTY_SENTINEL`].
    pub fn into_payload(self) -> Result<String, ClipboardError> {
        match self {
            Self::Absent | Self::Null => Ok(EMPTY_SENTINEL.to_string()),
            Self::Str(s) if s.is_empty() => Ok(EMPTY_SENTINEL.to_string()),
            Self::Str(s) => Ok(s),
            Self::Bool(b) => Ok(b.to_string()),
            Self::Number(n) => Ok(format_number(n)),
            other => Err(ClipboardError::InvalidPayload(other.kind())),
        }
    }
}

impl<E> fmt::Debug for Arg<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            other => f.write_str(other.kind()),
        }
    }
}

impl<E> From<&str> for Arg<E> {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl<E> From<String> for Arg<E> {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<E> From<bool> for Arg<E> {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<E> From<f64> for Arg<E> {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Build copy options from the second and third positional arguments.
///
/// A string second argument names the attribute. A boolean second
/// argument is the trim flag when no third argument is given. Otherwise
/// trim is the truthiness of the third argument.
pub fn copy_options<E>(second: &Arg<E>, third: &Arg<E>) -> CopyOptions {
    let trim = match (second, third) {
        (Arg::Bool(flag), Arg::Absent) => *flag,
        (_, third) => third.is_truthy(),
    };
    let options = CopyOptions::new().trim(trim);
    match second {
        Arg::Str(name) => options.attribute(name.as_str()),
        _ => options,
    }
}

/// Format a number the way script string coercion does for common values.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        let sign = if n < 0.0 { "-" } else { "" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        // Covers -0.
        "0".into()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form always carries a sign: 1e+21, 1.5e-7.
        let exp = format!("{n:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{mantissa}e+{power}")
            }
            _ => exp,
        }
    } else {
        n.to_string()
    }
}

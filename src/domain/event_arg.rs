//! Loosely typed event arguments.
//!
//! Handlers receive a slice of [`EventArg`]s. Any event can carry any shaped
//! payload; the handler decides how to interpret it. This trades static
//! per-event typing for flexibility, while keeping every value inspectable
//! through a closed set of variants.

use serde::{Deserialize, Serialize};

/// A single argument passed through [`crate::EventRegistry::publish`] to
/// every handler unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventArg {
    /// Absence of a value.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Arbitrary structured payload.
    Json(serde_json::Value),
}

impl EventArg {
    /// Returns the string slice if this is [`EventArg::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the value as `i64` for integer variants that fit.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `u64` for integer variants that fit.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the float if this is [`EventArg::Float`].
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the flag if this is [`EventArg::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` for [`EventArg::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the variant name as a static string slice.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Json(_) => "json",
        }
    }
}

impl From<()> for EventArg {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl From<bool> for EventArg {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for EventArg {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for EventArg {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for EventArg {
    fn from(v: u32) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<u64> for EventArg {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for EventArg {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for EventArg {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for EventArg {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for EventArg {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<serde_json::Value> for EventArg {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T> From<Option<T>> for EventArg
where
    T: Into<EventArg>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Builds a `Vec<EventArg>` from heterogeneous expressions.
///
/// ```
/// use event_registry::{EventArg, event_args};
///
/// let args = event_args!["alice", 42, true];
/// assert_eq!(args.first(), Some(&EventArg::Str("alice".to_string())));
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! event_args {
    () => {
        ::std::vec::Vec::<$crate::EventArg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::EventArg::from($arg)),+]
    };
}

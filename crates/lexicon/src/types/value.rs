use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// The argument bag passed to a single `translate` or `render` call.
pub type Args = HashMap<String, Value>;

/// A runtime value that fills a template placeholder.
///
/// # Example
///
/// ```
/// use lexicon::Value;
///
/// let count: Value = 42.into();
/// let name: Value = "Alice".into();
/// let flag: Value = true.into();
///
/// assert_eq!(count.as_number(), Some(42.0));
/// assert_eq!(name.as_string(), Some("Alice"));
/// assert_eq!(flag.to_string(), "true");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An integer (the common case for plural counts).
    Number(i64),

    /// A floating-point number.
    Float(f64),

    /// A string value.
    String(String),

    /// A boolean, usually consumed by `select`.
    Bool(bool),

    /// A point in time, rendered through the configured `ValueFormatter`.
    Date(SystemTime),
}

impl Value {
    /// Numeric view used for plural selection.
    ///
    /// Numeric strings (`"5"`, `" 2.5 "`) are accepted; booleans, dates and
    /// other strings are not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Value::Bool(_) | Value::Date(_) => None,
        }
    }

    /// Get this value as a string, if it is one.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The key this value selects in a `select` placeholder.
    ///
    /// Dates have no textual key and select the `other` clause.
    pub fn select_key(&self) -> Option<String> {
        match self {
            Value::Date(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(date) => match date.duration_since(UNIX_EPOCH) {
                Ok(elapsed) => write!(f, "{}", elapsed.as_secs()),
                Err(before) => write!(f, "-{}", before.duration().as_secs()),
            },
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(i64::from(n))
    }
}

/// Values above `i64::MAX` become floats rather than wrapping.
impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Value::Float(n as f64), Value::Number)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Value::Float(n as f64), Value::Number)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<SystemTime> for Value {
    fn from(date: SystemTime) -> Self {
        Value::Date(date)
    }
}

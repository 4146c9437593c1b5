//! Attribute keys and values.
//!
//! An [`Attr`] pairs a key with a [`Value`]. Values are either scalars,
//! timestamps, nested groups of attributes, or lazy values that are only
//! computed when a record is rendered.
//!
//! # Examples
//!
//! ```
//! use tracing_devslog::value::{Attr, Value};
//!
//! let request = Attr::group("request", vec![
//!     Attr::new("method", "GET"),
//!     Attr::new("status", 200_u64),
//! ]);
//!
//! assert!(!request.is_empty());
//! assert!(Attr::default().is_empty());
//! ```
use chrono::{DateTime, FixedOffset, Offset, TimeZone};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Lazy values are forced at most this many times before giving up.
const MAX_RESOLVE_DEPTH: usize = 100;

/// A value that computes its loggable form when it is rendered.
///
/// This trait is implemented for all `Fn() -> Value` closures that are
/// `Send + Sync`, so expensive values can be deferred without a new type.
///
/// # Examples
///
/// ```
/// use tracing_devslog::value::{Attr, Kind, Value};
///
/// let attr = Attr::lazy("answer", || Value::from(42_i64));
/// assert_eq!(attr.value.kind(), Kind::Lazy);
/// assert_eq!(attr.value.resolve().kind(), Kind::I64);
/// ```
pub trait LogValue: Send + Sync + 'static {
    /// Returns the value to log in place of `self`.
    ///
    /// The returned value may be lazy itself, in which case it is forced too.
    fn log_value(&self) -> Value;
}

impl<F> LogValue for F
where
    F: Fn() -> Value + Send + Sync + 'static,
{
    #[inline]
    fn log_value(&self) -> Value {
        self()
    }
}

impl fmt::Debug for dyn LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogValue")
    }
}

/// The kind of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Empty,
    String,
    Bool,
    I64,
    U64,
    F64,
    Duration,
    Time,
    Group,
    Lazy,
}

/// The value half of an [`Attr`].
#[derive(Clone, Debug)]
pub enum Value {
    /// The zero value. An attribute with an empty key and this value is ignored.
    Empty,
    String(Cow<'static, str>),
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Duration(Duration),
    /// A point in time, kept in the offset it was created with.
    Time(DateTime<FixedOffset>),
    /// A nested, ordered set of attributes.
    Group(Vec<Attr>),
    /// A deferred value, see [`LogValue`].
    Lazy(Arc<dyn LogValue>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Empty
    }
}

impl Value {
    /// Returns the kind of this value without resolving it.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Empty => Kind::Empty,
            Value::String(_) => Kind::String,
            Value::Bool(_) => Kind::Bool,
            Value::I64(_) => Kind::I64,
            Value::U64(_) => Kind::U64,
            Value::F64(_) => Kind::F64,
            Value::Duration(_) => Kind::Duration,
            Value::Time(_) => Kind::Time,
            Value::Group(_) => Kind::Group,
            Value::Lazy(_) => Kind::Lazy,
        }
    }

    /// Forces lazy values until a non-lazy value is produced.
    ///
    /// Values that are still lazy after 100 resolutions are replaced with a
    /// string describing the failure, so rendering always makes progress.
    pub fn resolve(self) -> Value {
        let mut value = self;
        for _ in 0..MAX_RESOLVE_DEPTH {
            value = match value {
                Value::Lazy(lazy) => lazy.log_value(),
                resolved => return resolved,
            };
        }

        match value {
            Value::Lazy(_) => Value::String(Cow::Owned(format!(
                "log value was still lazy after {} resolutions",
                MAX_RESOLVE_DEPTH
            ))),
            resolved => resolved,
        }
    }

    /// Like [`Value::resolve`], but only clones the value if it is lazy.
    pub fn resolved(&self) -> Cow<'_, Value> {
        match self {
            Value::Lazy(_) => Cow::Owned(self.clone().resolve()),
            resolved => Cow::Borrowed(resolved),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("<empty>"),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => fmt::Display::fmt(b, f),
            Value::I64(n) => fmt::Display::fmt(n, f),
            Value::U64(n) => fmt::Display::fmt(n, f),
            Value::F64(n) => fmt::Display::fmt(n, f),
            Value::Duration(d) => fmt::Debug::fmt(d, f),
            Value::Time(t) => f.write_str(&t.to_rfc3339()),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("]")
            }
            Value::Lazy(lazy) => fmt::Display::fmt(&lazy.log_value().resolve(), f),
        }
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::String(Cow::Borrowed(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Cow::Owned(s))
    }
}

impl From<Cow<'static, str>> for Value {
    fn from(s: Cow<'static, str>) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::I64(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::I64(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::U64(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::U64(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::F64(n)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(t: DateTime<Tz>) -> Self {
        let offset = t.offset().fix();
        Value::Time(t.with_timezone(&offset))
    }
}

impl From<Vec<Attr>> for Value {
    fn from(attrs: Vec<Attr>) -> Self {
        Value::Group(attrs)
    }
}

/// A key-value pair.
///
/// `Attr::default()` has an empty key and an empty value, and is skipped
/// entirely when rendered.
#[derive(Clone, Debug, Default)]
pub struct Attr {
    pub key: Cow<'static, str>,
    pub value: Value,
}

impl Attr {
    /// Returns a new attribute from anything convertible into a [`Value`].
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<Value>,
    {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns a time-valued attribute.
    pub fn time<K, Tz>(key: K, time: DateTime<Tz>) -> Self
    where
        K: Into<Cow<'static, str>>,
        Tz: TimeZone,
    {
        Attr::new(key, time)
    }

    /// Returns a group attribute.
    ///
    /// An empty key makes an anonymous group, whose attributes are inlined
    /// at the current level of indentation.
    pub fn group<K>(key: K, attrs: Vec<Attr>) -> Self
    where
        K: Into<Cow<'static, str>>,
    {
        Attr::new(key, Value::Group(attrs))
    }

    /// Returns an attribute whose value is computed when it is rendered.
    pub fn lazy<K, L>(key: K, value: L) -> Self
    where
        K: Into<Cow<'static, str>>,
        L: LogValue,
    {
        Attr {
            key: key.into(),
            value: Value::Lazy(Arc::new(value)),
        }
    }

    /// Returns `true` if both the key and the value are empty.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

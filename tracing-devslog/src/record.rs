//! The unit of work handed to a [`Handler`][crate::Handler].
use crate::value::Attr;
use chrono::{DateTime, FixedOffset, Offset, TimeZone};
#[cfg(feature = "smallvec")]
use smallvec::SmallVec;
use std::borrow::Cow;
use tracing::Level;

#[cfg(feature = "smallvec")]
pub(crate) type Attrs = SmallVec<[Attr; 5]>;
#[cfg(not(feature = "smallvec"))]
pub(crate) type Attrs = Vec<Attr>;

/// A single log record: the built-in fields plus its own attributes.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tracing::Level;
/// use tracing_devslog::{Attr, Record};
///
/// let now = Utc.with_ymd_and_hms(2009, 11, 9, 23, 0, 0).unwrap();
/// let record = Record::new(Level::INFO, "msg")
///     .with_time(now)
///     .with_attr(Attr::time("foo", now));
///
/// assert_eq!(record.num_attrs(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Record {
    time: Option<DateTime<FixedOffset>>,
    level: Level,
    message: Cow<'static, str>,
    attrs: Attrs,
}

impl Record {
    /// Returns a new record without a time or attributes.
    ///
    /// Records without a time leave it out of the rendered output.
    pub fn new<M>(level: Level, message: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        Record {
            time: None,
            level,
            message: message.into(),
            attrs: Attrs::new(),
        }
    }

    /// Sets the time of the record, keeping the offset it was created with.
    pub fn with_time<Tz: TimeZone>(mut self, time: DateTime<Tz>) -> Self {
        let offset = time.offset().fix();
        self.time = Some(time.with_timezone(&offset));
        self
    }

    /// Appends attributes to the record.
    pub fn add_attrs<I>(&mut self, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.attrs.extend(attrs);
    }

    /// Appends one attribute, returning the record for chaining.
    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn time(&self) -> Option<&DateTime<FixedOffset>> {
        self.time.as_ref()
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs[..]
    }

    /// The number of attributes attached directly to the record.
    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }
}

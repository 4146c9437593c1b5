//! Rendering records and writing them to a shared sink.
//!
//! See [`Handler`] for more details.
use crate::pretty::Pretty;
use crate::record::Record;
use crate::scope::{GroupOrAttrs, Scope};
use crate::value::Attr;
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::Level;

/// Configuration for a [`Handler`].
///
/// # Examples
/// ```
/// use tracing::Level;
/// use tracing_devslog::HandlerOptions;
///
/// let options = HandlerOptions::new().level(Level::DEBUG).ansi(false);
/// assert_eq!(options.min_level(), Level::DEBUG);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandlerOptions {
    level: Level,
    ansi: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        HandlerOptions {
            level: Level::INFO,
            ansi: true,
        }
    }
}

impl HandlerOptions {
    /// Returns the default options: records at `INFO` and above, with colors.
    pub fn new() -> Self {
        HandlerOptions::default()
    }

    /// Sets the least severe level that is handled.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets whether ANSI color codes are written.
    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn min_level(&self) -> Level {
        self.level
    }

    pub fn is_ansi(&self) -> bool {
        self.ansi
    }
}

/// Renders records as indented, colorized text and writes them to a sink.
///
/// Handlers are cheap to clone. [`with_attrs`] and [`with_group`] never
/// change the handler they are called on: they return a new handler with its
/// own [`Scope`], sharing the sink and its lock with every other handler
/// derived from the same root.
///
/// # Examples
/// ```
/// use tracing::Level;
/// use tracing_devslog::{Attr, Handler, Record};
///
/// let handler = Handler::new(std::io::stderr())
///     .with_group("request")
///     .with_attrs(vec![Attr::new("method", "GET")]);
///
/// handler.handle(&Record::new(Level::INFO, "received")).unwrap();
/// ```
/// ```log
/// INFO received
///  ↳ request:
///      ↳ method: GET
/// ```
///
/// [`with_attrs`]: Handler::with_attrs
/// [`with_group`]: Handler::with_group
pub struct Handler<W> {
    options: HandlerOptions,
    sink: Arc<Mutex<W>>,
    scope: Scope,
}

impl<W> Clone for Handler<W> {
    fn clone(&self) -> Self {
        Handler {
            options: self.options,
            sink: Arc::clone(&self.sink),
            scope: self.scope.clone(),
        }
    }
}

impl<W> fmt::Debug for Handler<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("options", &self.options)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl<W: Write> Handler<W> {
    /// Returns a handler writing to `writer` with the default options.
    pub fn new(writer: W) -> Self {
        Handler::with_options(writer, HandlerOptions::default())
    }

    /// Returns a handler writing to `writer`.
    pub fn with_options(writer: W, options: HandlerOptions) -> Self {
        Handler {
            options,
            sink: Arc::new(Mutex::new(writer)),
            scope: Scope::new(),
        }
    }

    /// Formats `record` and writes it to the sink while holding the lock.
    ///
    /// The record is fully rendered before the sink is locked, so records
    /// from concurrent callers never interleave.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying writer, if any.
    pub fn handle(&self, record: &Record) -> io::Result<()> {
        let buf = Pretty::with_ansi(self.options.ansi)
            .fmt(record, &self.scope)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        // A panic while writing doesn't leave the sink in a state we care about.
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write_all(buf.as_bytes())
    }
}

impl<W> Handler<W> {
    /// Returns `true` if records at `level` are handled.
    pub fn enabled(&self, level: Level) -> bool {
        // `tracing` orders levels by verbosity, so more severe is smaller.
        level <= self.options.level
    }

    /// Returns a handler with `attrs` attached at the current group.
    ///
    /// If `attrs` is empty, the returned handler is a clone of `self`.
    pub fn with_attrs<I>(&self, attrs: I) -> Self
    where
        I: IntoIterator<Item = Attr>,
    {
        let attrs: Vec<Attr> = attrs.into_iter().collect();
        if attrs.is_empty() {
            return self.clone();
        }

        self.with_entry(GroupOrAttrs::Attrs(attrs))
    }

    /// Returns a handler that nests everything that follows in a group.
    ///
    /// If `name` is empty, the returned handler is a clone of `self`.
    pub fn with_group<N>(&self, name: N) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        let name = name.into();
        if name.is_empty() {
            return self.clone();
        }

        self.with_entry(GroupOrAttrs::Group(name))
    }

    fn with_entry(&self, entry: GroupOrAttrs) -> Self {
        Handler {
            options: self.options,
            sink: Arc::clone(&self.sink),
            scope: self.scope.extend(entry),
        }
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns `true` if both handlers write through the same lock.
    pub fn shares_sink(&self, other: &Handler<W>) -> bool {
        Arc::ptr_eq(&self.sink, &other.sink)
    }
}

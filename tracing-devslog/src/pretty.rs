use crate::color;
use crate::record::Record;
use crate::scope::{GroupOrAttrs, Scope};
use crate::value::{Attr, Value};
use chrono::{DateTime, FixedOffset};
use std::fmt::{self, Write};

/// Marks the start of an attribute line.
pub(crate) const ATTR_PREFIX: &str = "↳";

/// Written between an attribute's key and its value.
pub(crate) const KEY_VALUE_DELIMITER: &str = ":";

/// The width of one level of group nesting.
pub(crate) const SPACES_PER_LEVEL: usize = 4;

/// Used for the record time and for time-valued attributes alike.
const TIME_FORMAT: &str = "%H:%M:%S";

/// Formats records for reading in a terminal.
///
/// The built-in fields go on the first line, and every attribute gets a line
/// of its own, indented by the groups it is nested in:
/// ```log
/// 23:00:00 INFO request finished
///  ↳ request:
///      ↳ method: GET
///      ↳ status: 200
///  ↳ elapsed: 1.5ms
/// ```
/// Levels are colored by severity and keys are grayed, unless ANSI output
/// is turned off.
#[derive(Clone, Copy, Debug)]
pub struct Pretty {
    ansi: bool,
}

impl Default for Pretty {
    fn default() -> Self {
        Pretty::new()
    }
}

impl Pretty {
    /// Returns a formatter that writes ANSI color codes.
    pub const fn new() -> Self {
        Pretty { ansi: true }
    }

    /// Returns a formatter that writes ANSI color codes if `ansi` is set.
    pub const fn with_ansi(ansi: bool) -> Self {
        Pretty { ansi }
    }

    /// Formats `record` nested in the groups and attributes of `scope`.
    pub fn fmt(&self, record: &Record, scope: &Scope) -> Result<String, fmt::Error> {
        let mut writer = String::with_capacity(256);

        if let Some(time) = record.time() {
            self.format_time(time, &mut writer)?;
            writer.write_char(' ')?;
        }

        let level = record.level();
        color::paint(&mut writer, self.ansi, color::level(level), level.as_str())?;
        writeln!(writer, " {}", record.message())?;

        // Groups at the end of the scope would render as empty headers if the
        // record doesn't bring attributes of its own.
        let mut indent = 0;
        for entry in scope.entries(record.num_attrs() == 0) {
            match entry {
                GroupOrAttrs::Group(name) => {
                    self.format_header(name, indent, &mut writer)?;
                    indent += 1;
                }
                GroupOrAttrs::Attrs(attrs) => {
                    for attr in attrs.iter() {
                        self.format_attr(attr, indent, &mut writer)?;
                    }
                }
            }
        }

        for attr in record.attrs() {
            self.format_attr(attr, indent, &mut writer)?;
        }

        Ok(writer)
    }

    fn format_time(&self, time: &DateTime<FixedOffset>, writer: &mut String) -> fmt::Result {
        write!(writer, "{}", time.format(TIME_FORMAT))
    }

    fn format_indent(&self, indent: usize, writer: &mut String) -> fmt::Result {
        write!(writer, "{:width$} {} ", "", ATTR_PREFIX, width = indent * SPACES_PER_LEVEL)
    }

    fn format_header(&self, name: &str, indent: usize, writer: &mut String) -> fmt::Result {
        self.format_indent(indent, writer)?;
        color::paint(writer, self.ansi, color::gray(), name)?;
        writeln!(writer, "{}", KEY_VALUE_DELIMITER)
    }

    fn format_key(&self, key: &str, indent: usize, writer: &mut String) -> fmt::Result {
        self.format_indent(indent, writer)?;
        color::paint(writer, self.ansi, color::gray(), key)?;
        write!(writer, "{} ", KEY_VALUE_DELIMITER)
    }

    fn format_attr(&self, attr: &Attr, indent: usize, writer: &mut String) -> fmt::Result {
        let value = attr.value.resolved();

        if attr.key.is_empty() && matches!(*value, Value::Empty) {
            return Ok(());
        }

        match &*value {
            Value::Time(time) => {
                self.format_key(&attr.key, indent, writer)?;
                self.format_time(time, writer)?;
                writeln!(writer)
            }
            Value::Group(attrs) => {
                if attrs.is_empty() {
                    return Ok(());
                }

                // Anonymous groups are inlined at the current level.
                let mut indent = indent;
                if !attr.key.is_empty() {
                    self.format_header(&attr.key, indent, writer)?;
                    indent += 1;
                }

                for attr in attrs.iter() {
                    self.format_attr(attr, indent, writer)?;
                }
                Ok(())
            }
            other => {
                self.format_key(&attr.key, indent, writer)?;
                writeln!(writer, "{}", other)
            }
        }
    }
}

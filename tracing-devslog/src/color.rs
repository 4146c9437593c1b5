use nu_ansi_term::{Color, Style};
use std::fmt::{self, Write};
use tracing::Level;

pub(crate) fn level(level: Level) -> Style {
    match level {
        Level::TRACE | Level::DEBUG => gray(),
        Level::INFO => Style::new().fg(Color::White),
        Level::WARN => Style::new().fg(Color::Yellow),
        Level::ERROR => Style::new().fg(Color::Red),
    }
}

pub(crate) fn gray() -> Style {
    Style::new().fg(Color::DarkGray)
}

/// Writes `text` wrapped in `style` and a reset, or as is if `ansi` is off.
pub(crate) fn paint(writer: &mut String, ansi: bool, style: Style, text: &str) -> fmt::Result {
    if ansi {
        write!(writer, "{}", style.paint(text))
    } else {
        writer.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_paired_with_a_reset() {
        let mut out = String::new();
        paint(&mut out, true, level(Level::ERROR), "ERROR").unwrap();
        assert_eq!(out, "\x1b[31mERROR\x1b[0m");

        out.clear();
        paint(&mut out, true, level(Level::WARN), "WARN").unwrap();
        assert_eq!(out, "\x1b[33mWARN\x1b[0m");

        out.clear();
        paint(&mut out, true, level(Level::INFO), "INFO").unwrap();
        assert_eq!(out, "\x1b[37mINFO\x1b[0m");

        out.clear();
        paint(&mut out, true, level(Level::DEBUG), "DEBUG").unwrap();
        assert_eq!(out, "\x1b[90mDEBUG\x1b[0m");
    }

    #[test]
    fn plain_text_without_ansi() {
        let mut out = String::new();
        paint(&mut out, false, gray(), "key").unwrap();
        assert_eq!(out, "key");
    }
}

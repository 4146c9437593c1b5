//! Reads rendered records back into maps, so tests can focus on the data.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

const ATTR_PREFIX: char = '↳';
const SPACES_PER_LEVEL: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Value(String),
    Group(Map),
}

pub type Map = BTreeMap<String, Node>;

#[derive(Debug, Default)]
pub struct Parsed {
    pub time: Option<String>,
    pub level: String,
    pub message: String,
    pub attrs: Map,
}

impl Parsed {
    pub fn get(&self, path: &[&str]) -> Option<&Node> {
        let (last, groups) = path.split_last()?;
        let mut map = &self.attrs;
        for group in groups {
            match map.get(*group)? {
                Node::Group(inner) => map = inner,
                Node::Value(_) => return None,
            }
        }
        map.get(*last)
    }

    pub fn value(&self, path: &[&str]) -> Option<&str> {
        match self.get(path)? {
            Node::Value(value) => Some(value),
            Node::Group(_) => None,
        }
    }
}

/// A cloneable writer that keeps everything written to it.
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn strip_ansi(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in &mut chars {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn is_time(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 8
        && bytes[2] == b':'
        && bytes[5] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit())
}

/// Parses the output of exactly one record.
pub fn parse(output: &str) -> Result<Parsed, String> {
    let mut records = parse_all(output)?;
    match records.len() {
        1 => Ok(records.remove(0)),
        n => Err(format!("expected one record, found {}", n)),
    }
}

/// Parses the output of any number of records.
///
/// Attribute lines start with a space, so every other line begins a record.
pub fn parse_all(output: &str) -> Result<Vec<Parsed>, String> {
    let mut records = Vec::new();
    let mut lines: Vec<String> = Vec::new();

    for line in output.lines().map(strip_ansi) {
        if !line.starts_with(' ') && !lines.is_empty() {
            records.push(parse_lines(&lines)?);
            lines.clear();
        }
        lines.push(line);
    }
    if !lines.is_empty() {
        records.push(parse_lines(&lines)?);
    }

    Ok(records)
}

fn parse_lines(lines: &[String]) -> Result<Parsed, String> {
    let (first, rest) = lines.split_first().ok_or("no lines")?;

    let mut parsed = Parsed::default();
    let mut tokens = first.splitn(2, ' ');
    let mut token = tokens.next().ok_or("empty first line")?;
    let mut remainder = tokens.next().unwrap_or("");

    if is_time(token) {
        parsed.time = Some(token.to_owned());
        let mut tokens = remainder.splitn(2, ' ');
        token = tokens.next().ok_or("missing level")?;
        remainder = tokens.next().unwrap_or("");
    }
    parsed.level = token.to_owned();
    parsed.message = remainder.to_owned();

    let mut attrs = Vec::with_capacity(rest.len());
    for line in rest {
        let (indent, content) = line
            .split_once(ATTR_PREFIX)
            .ok_or_else(|| format!("no attribute prefix in {:?}", line))?;

        if indent.is_empty() || indent.chars().any(|c| c != ' ') {
            return Err(format!("bad indentation in {:?}", line));
        }
        if (indent.len() - 1) % SPACES_PER_LEVEL != 0 {
            return Err(format!("indentation isn't a whole level in {:?}", line));
        }
        let depth = (indent.len() - 1) / SPACES_PER_LEVEL;

        let (key, value) = content
            .split_once(':')
            .ok_or_else(|| format!("no key-value delimiter in {:?}", line))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("empty key in {:?}", line));
        }
        let value = value.trim();
        let value = if value.is_empty() {
            None
        } else {
            Some(value.to_owned())
        };

        attrs.push((depth, key.to_owned(), value));
    }

    let mut pos = 0;
    parsed.attrs = build(&attrs, &mut pos, 0)?;
    Ok(parsed)
}

fn build(
    lines: &[(usize, String, Option<String>)],
    pos: &mut usize,
    depth: usize,
) -> Result<Map, String> {
    let mut map = Map::new();

    while let Some((line_depth, key, value)) = lines.get(*pos) {
        if *line_depth < depth {
            break;
        }
        if *line_depth > depth {
            return Err(format!("{:?} is indented deeper than its group", key));
        }
        *pos += 1;

        let node = match value {
            Some(value) => Node::Value(value.clone()),
            None => Node::Group(build(lines, pos, depth + 1)?),
        };
        map.insert(key.clone(), node);
    }

    Ok(map)
}

//! Field tag parsing
//!
//! A tag string looks like `value,key=v1,key=v2,flag`. The first segment is the
//! tag value, the remaining ones are arguments. Splitting ignores separators
//! nested inside `[]`, `{}`, `()` and `<>` so placeholders and lists survive.

use std::collections::BTreeMap;
use std::fmt;

use crate::constants::ARG_REQUIRED;

/// Parsed tag arguments, each key holding zero or more values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagArg {
    args: BTreeMap<String, Vec<String>>,
}

impl TagArg {
    /// Values recorded for `arg`
    pub fn get(&self, arg: &str) -> Option<&[String]> {
        self.args.get(arg).map(Vec::as_slice)
    }

    /// First value recorded for `arg`
    pub fn first(&self, arg: &str) -> Option<&str> {
        self.args.get(arg)?.first().map(String::as_str)
    }

    /// Whether `arg` was present, with or without a value
    pub fn has(&self, arg: &str) -> bool {
        self.args.contains_key(arg)
    }

    /// Append a value to `arg`
    pub fn add(&mut self, arg: &str, value: &str) {
        self.args
            .entry(arg.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Record `arg` as a bare flag
    pub fn mark(&mut self, arg: &str) {
        self.args.entry(arg.to_string()).or_default();
    }

    /// Replace every value of `arg`
    pub fn set(&mut self, arg: &str, values: Vec<String>) {
        self.args.insert(arg.to_string(), values);
    }

    pub fn remove(&mut self, arg: &str) -> Option<Vec<String>> {
        self.args.remove(arg)
    }

    /// Dependencies are required unless the tag says `required=false`
    pub fn required(&self) -> bool {
        !matches!(self.first(ARG_REQUIRED), Some(v) if v.trim().eq_ignore_ascii_case("false"))
    }

    /// All values of `arg` with `[a,b]` lists and whitespace separated words expanded
    pub fn values_flat(&self, arg: &str) -> Vec<String> {
        self.get(arg)
            .into_iter()
            .flatten()
            .flat_map(|value| expand(value))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.args.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for TagArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, values) in &self.args {
            if values.is_empty() {
                if !first {
                    f.write_str(",")?;
                }
                f.write_str(key)?;
                first = false;
            }
            for value in values {
                if !first {
                    f.write_str(",")?;
                }
                write!(f, "{key}={value}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Split a raw tag into its value and arguments
pub fn parse(tag: &str) -> (String, TagArg) {
    let mut segments = split_top_level(tag, ',').into_iter();
    let value = segments.next().unwrap_or_default().trim().to_string();
    let mut args = TagArg::default();
    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match segment.split_once('=') {
            Some((key, value)) => args.add(key.trim(), value.trim()),
            None => args.mark(segment),
        }
    }
    (value, args)
}

/// Split on `separator` wherever no bracket is open
///
/// Unbalanced `<` is treated as a literal once a matching outer bracket closes.
pub fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut open: Vec<char> = Vec::new();
    let mut start = 0;
    for (idx, ch) in input.char_indices() {
        match ch {
            '[' | '{' | '(' | '<' => open.push(ch),
            ']' | '}' | ')' | '>' => close_bracket(&mut open, ch),
            c if c == separator && open.is_empty() => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn close_bracket(open: &mut Vec<char>, closer: char) {
    let opener = match closer {
        ']' => '[',
        '}' => '{',
        ')' => '(',
        _ => '<',
    };
    if let Some(pos) = open.iter().rposition(|c| *c == opener) {
        open.truncate(pos);
    }
}

fn expand(value: &str) -> Vec<String> {
    let value = value.trim();
    match value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        Some(inner) => split_top_level(inner, ',')
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        None => value.split_whitespace().map(String::from).collect(),
    }
}

//! In-memory configuration tree addressed by dotted paths

use std::sync::{PoisonError, RwLock};

use figment::Figment;
use serde_json::{Map, Value};
use tracing::warn;
use wirekit_application::Configure;
use wirekit_domain::error::Result;

use crate::constants::MAX_ARRAY_GROWTH;
use crate::error_ext::ErrorContext;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// A JSON document behind a lock
#[derive(Debug)]
pub struct ConfigTree {
    root: RwLock<Value>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self {
            root: RwLock::new(value),
        }
    }

    /// Extract every provider merged into `figment`
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let value: Value = figment
            .extract()
            .config_context("Failed to extract configuration")?;
        Ok(Self::from_value(value))
    }

    /// Copy of the whole document
    pub fn snapshot(&self) -> Value {
        self.root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Configure for ConfigTree {
    fn get(&self, path: &str) -> Option<Value> {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        let mut current = &*root;
        for segment in parse_path(path) {
            current = match (&segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key)?,
                (Segment::Key(key), Value::Array(items)) => items.get(key.parse::<usize>().ok()?)?,
                (Segment::Index(idx), Value::Array(items)) => items.get(*idx)?,
                _ => return None,
            };
        }
        Some(current.clone())
    }

    /// An array index more than [`MAX_ARRAY_GROWTH`] past the current end is
    /// rejected with a warning and leaves the tree untouched
    fn set(&self, path: &str, value: Value) {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        let segments = parse_path(path);
        let Some((last, parents)) = segments.split_last() else {
            *root = value;
            return;
        };
        if !fits(&root, &segments) {
            warn!(path, "Array index too far past the end, configuration value ignored");
            return;
        }
        let mut current = &mut *root;
        for segment in parents {
            current = child_mut(current, segment);
        }
        let index = match last {
            Segment::Index(idx) => Some(*idx),
            Segment::Key(key) if current.is_array() => key.parse::<usize>().ok(),
            Segment::Key(_) => None,
        };
        match (index, current) {
            (Some(idx), Value::Array(items)) => *slot(items, idx) = value,
            (_, current) => {
                if !current.is_object() {
                    *current = Value::Object(Map::new());
                }
                if let Value::Object(map) = current {
                    map.insert(segment_key(last), value);
                }
            }
        }
    }
}

/// Whether every array index on `segments` stays within growth bounds
fn fits(root: &Value, segments: &[Segment]) -> bool {
    let mut current = Some(root);
    for segment in segments {
        let node = current.take();
        match (segment, node) {
            (Segment::Index(idx), Some(Value::Array(items))) => {
                if !within_growth(items.len(), *idx) {
                    return false;
                }
                current = items.get(*idx);
            }
            (Segment::Key(key), Some(Value::Array(items))) => match key.parse::<usize>() {
                Ok(idx) if !within_growth(items.len(), idx) => return false,
                Ok(idx) => current = items.get(idx),
                Err(_) => {}
            },
            (Segment::Key(key), Some(Value::Object(map))) => current = map.get(key),
            _ => {}
        }
    }
    true
}

fn within_growth(len: usize, idx: usize) -> bool {
    len.checked_add(MAX_ARRAY_GROWTH).is_some_and(|limit| idx < limit)
}

/// Element `idx`, padding with nulls; callers check [`within_growth`] first
fn slot(items: &mut Vec<Value>, idx: usize) -> &mut Value {
    if items.len() <= idx {
        items.resize(idx + 1, Value::Null);
    }
    &mut items[idx]
}

/// Descend one level, replacing scalars with containers as needed
fn child_mut<'a>(current: &'a mut Value, segment: &Segment) -> &'a mut Value {
    let index = match (segment, &*current) {
        (Segment::Index(idx), Value::Array(_)) => Some(*idx),
        (Segment::Key(key), Value::Array(_)) => key.parse::<usize>().ok(),
        _ => None,
    };
    if index.is_none() && !current.is_object() {
        *current = Value::Object(Map::new());
    }
    match (index, current) {
        (Some(idx), Value::Array(items)) => slot(items, idx),
        (_, Value::Object(map)) => map
            .entry(segment_key(segment))
            .or_insert_with(|| Value::Object(Map::new())),
        (_, other) => other,
    }
}

fn segment_key(segment: &Segment) -> String {
    match segment {
        Segment::Key(key) => key.clone(),
        Segment::Index(idx) => idx.to_string(),
    }
}

/// `a.b[0].c` becomes `Key(a) Key(b) Index(0) Key(c)`
fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for part in path.split('.').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };
        if !key.is_empty() {
            segments.push(Segment::Key(key.to_string()));
        }
        while let Some(inner) = rest.strip_prefix('[') {
            let Some(end) = inner.find(']') else { break };
            match inner[..end].trim().parse::<usize>() {
                Ok(idx) => segments.push(Segment::Index(idx)),
                Err(_) => segments.push(Segment::Key(inner[..end].to_string())),
            }
            rest = &inner[end + 1..];
        }
    }
    segments
}

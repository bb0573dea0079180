//! Path-addressed access to nested JSON values.
//!
//! Paths are `/`-delimited; segments that parse as unsigned integers address
//! array elements, every other segment addresses an object key.

use serde_json::{Map, Value};

/// Delimiter between path segments.
pub const DELIMITER: char = '/';

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

/// Splits a path into segments, ignoring empty ones.
pub fn segments(path: &str) -> Vec<Segment<'_>> {
    path.split(DELIMITER)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Key(s),
        })
        .collect()
}

/// A minimal nested update along a single path.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Value(Value),
    Key(String, Box<Patch>),
    Index(usize, Box<Patch>),
}

impl Patch {
    /// Builds the nested update that places `value` at `path`.
    pub fn along(path: &[Segment<'_>], value: Value) -> Self {
        path.iter().rev().fold(Self::Value(value), |inner, segment| match segment {
            Segment::Key(key) => Self::Key((*key).to_string(), Box::new(inner)),
            Segment::Index(index) => Self::Index(*index, Box::new(inner)),
        })
    }

    /// Deep-merges the patch into `target`.
    ///
    /// Containers along the path are created when missing or when the
    /// existing value has the wrong shape.
    pub fn merge_into(self, target: &mut Value) {
        match self {
            Self::Value(value) => deep_merge(target, value),
            Self::Key(key, inner) => {
                if !target.is_object() {
                    *target = Value::Object(Map::new());
                }
                if let Value::Object(map) = target {
                    inner.merge_into(map.entry(key).or_insert(Value::Null));
                }
            }
            Self::Index(index, inner) => {
                if !target.is_array() {
                    *target = Value::Array(Vec::new());
                }
                if let Value::Array(items) = target {
                    if items.len() <= index {
                        items.resize(index + 1, Value::Null);
                    }
                    inner.merge_into(&mut items[index]);
                }
            }
        }
    }
}

/// Recursively merges `source` into `target`.
///
/// Objects merge key by key and arrays merge index by index; any other
/// combination replaces the target.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target_items), Value::Array(source_items)) => {
            for (index, value) in source_items.into_iter().enumerate() {
                match target_items.get_mut(index) {
                    Some(existing) => deep_merge(existing, value),
                    None => target_items.push(value),
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Resolves `path` inside `value`.
pub fn get<'v>(value: &'v Value, path: &[Segment<'_>]) -> Option<&'v Value> {
    path.iter().try_fold(value, |current, segment| match segment {
        Segment::Key(key) => current.as_object()?.get(*key),
        Segment::Index(index) => match current {
            Value::Array(items) => items.get(*index),
            Value::Object(map) => map.get(&index.to_string()),
            _ => None,
        },
    })
}

/// Removes the value at `path`. Array slots are cleared to `null` so that
/// sibling indices are preserved.
///
/// Returns `true` when something was removed.
pub fn unset(value: &mut Value, path: &[Segment<'_>]) -> bool {
    let Some((last, parents)) = path.split_last() else {
        return false;
    };
    let mut current = value;
    for segment in parents {
        let next = match segment {
            Segment::Key(key) => current.as_object_mut().and_then(|m| m.get_mut(*key)),
            Segment::Index(index) => current.as_array_mut().and_then(|a| a.get_mut(*index)),
        };
        match next {
            Some(next) => current = next,
            None => return false,
        }
    }
    match (last, current) {
        (Segment::Key(key), Value::Object(map)) => map.shift_remove(*key).is_some(),
        (Segment::Index(index), Value::Array(items)) => match items.get_mut(*index) {
            Some(slot) => {
                *slot = Value::Null;
                true
            }
            None => false,
        },
        _ => false,
    }
}

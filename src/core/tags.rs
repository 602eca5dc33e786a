//! String-keyed typed metadata attached to tracks and sessions

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

/// Well-known tag names
pub const TAG_TITLE: &str = "track::title";
pub const TAG_ARTIST: &str = "track::artist";
pub const TAG_ISRC: &str = "track::isrc";
pub const TAG_STREAM_PREGAP: &str = "track::stream::pregap";

/// A tag value
#[derive(Clone)]
pub enum TagValue {
    Int(i64),
    Str(String),
    /// Anything else; compared by identity
    Opaque(Rc<dyn Any>),
}

impl TagValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for TagValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TagValue::Int(a), TagValue::Int(b)) => a == b,
            (TagValue::Str(a), TagValue::Str(b)) => a == b,
            (TagValue::Opaque(a), TagValue::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for TagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagValue::Int(value) => write!(f, "Int({})", value),
            TagValue::Str(value) => write!(f, "Str({:?})", value),
            TagValue::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Str(value)
    }
}

/// Tag mapping; insertion order is not kept
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags {
    values: HashMap<String, TagValue>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a tag, returning the value it replaced
    pub fn insert(&mut self, tag: &str, value: TagValue) -> Option<TagValue> {
        self.values.insert(tag.to_string(), value)
    }

    pub fn get(&self, tag: &str) -> Option<&TagValue> {
        self.values.get(tag)
    }

    pub fn get_int(&self, tag: &str) -> Option<i64> {
        self.get(tag).and_then(TagValue::as_int)
    }

    pub fn get_str(&self, tag: &str) -> Option<&str> {
        self.get(tag).and_then(TagValue::as_str)
    }

    pub fn remove(&mut self, tag: &str) -> Option<TagValue> {
        self.values.remove(tag)
    }

    /// Copy every tag of `other` that is not set here
    pub fn copy_missing(&mut self, other: &Tags) {
        for (tag, value) in &other.values {
            self.values
                .entry(tag.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

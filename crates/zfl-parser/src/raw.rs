//! Loosely typed parse result: ordered maps, lists and scalars.
//!
//! [`RawDocument`] is what [`RawTreeBuilder`](crate::builder::RawTreeBuilder)
//! produces and what the analyzer consumes. All accessors fall back to an
//! empty default instead of failing, so a partially parsed document can
//! still be analyzed.

use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::Serialize;

use zfl_core::{diagnostic::Diagnostic, source::SourceRef};

static EMPTY_MAP: LazyLock<RawMap> = LazyLock::new(RawMap::new);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Scalar(Scalar),
    Sequence(Vec<RawValue>),
    Mapping(RawMap),
}

impl RawValue {
    pub fn null() -> Self {
        RawValue::Scalar(Scalar::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Scalar(Scalar::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Scalar(Scalar::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Scalar(Scalar::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            RawValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Text form of a scalar: strings as-is, booleans and numbers formatted.
    pub fn to_text(&self) -> Option<String> {
        match self {
            RawValue::Scalar(Scalar::String(value)) => Some(value.clone()),
            RawValue::Scalar(Scalar::Bool(value)) => Some(value.to_string()),
            RawValue::Scalar(Scalar::Number(value)) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Scalar(Scalar::String(value))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Scalar(Scalar::Bool(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Scalar(Scalar::Number(value))
    }
}

impl From<RawMap> for RawValue {
    fn from(value: RawMap) -> Self {
        RawValue::Mapping(value)
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(value: Vec<RawValue>) -> Self {
        RawValue::Sequence(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(RawValue::null, Into::into)
    }
}

/// An insertion-ordered string-keyed map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawMap(IndexMap<String, RawValue>);

impl RawMap {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert or replace `key`, keeping its original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut RawValue> {
        self.0.values_mut()
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut RawValue> {
        self.0.get_mut(key)
    }

    /// String value at `key`, `""` when missing or not a string.
    pub fn get_str(&self, key: &str) -> &str {
        self.get_opt_str(key).unwrap_or("")
    }

    pub fn get_opt_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(RawValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(RawValue::as_bool)
    }

    /// Map at `key`, an empty map when missing or not a map.
    pub fn get_map(&self, key: &str) -> &RawMap {
        self.get(key).and_then(RawValue::as_map).unwrap_or(&EMPTY_MAP)
    }

    pub fn get_map_mut(&mut self, key: &str) -> Option<&mut RawMap> {
        match self.0.get_mut(key) {
            Some(RawValue::Mapping(map)) => Some(map),
            _ => None,
        }
    }

    /// List at `key`, empty when missing or not a list.
    pub fn get_list(&self, key: &str) -> &[RawValue] {
        self.get(key).and_then(RawValue::as_list).unwrap_or(&[])
    }

    pub fn get_list_mut(&mut self, key: &str) -> Option<&mut Vec<RawValue>> {
        match self.0.get_mut(key) {
            Some(RawValue::Sequence(items)) => Some(items),
            _ => None,
        }
    }

    /// String items of the list at `key`; non-string items are skipped.
    pub fn get_strings(&self, key: &str) -> Vec<String> {
        self.get_list(key)
            .iter()
            .filter_map(RawValue::as_str)
            .map(str::to_string)
            .collect()
    }
}

impl FromIterator<(String, RawValue)> for RawMap {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Output of raw tree construction for one source text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    root: RawMap,
    locations: IndexMap<String, SourceRef>,
    diagnostics: Vec<Diagnostic>,
    file_name: String,
}

impl RawDocument {
    pub fn new(
        root: RawMap,
        locations: IndexMap<String, SourceRef>,
        diagnostics: Vec<Diagnostic>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            root,
            locations,
            diagnostics,
            file_name: file_name.into(),
        }
    }

    pub fn root(&self) -> &RawMap {
        &self.root
    }

    pub fn locations(&self) -> &IndexMap<String, SourceRef> {
        &self.locations
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Recorded location of `path`, or the start of the file.
    pub fn location(&self, path: &str) -> SourceRef {
        self.locations
            .get(path)
            .cloned()
            .unwrap_or_else(|| SourceRef::start_of(self.file_name.as_str()))
    }

    /// Look up a value by a dotted/bracketed path such as
    /// `$.flows.Payments.whens[0].command`.
    ///
    /// Intended for diagnostics and tests.
    pub fn query(&self, path: &str) -> Option<&RawValue> {
        let path = path.strip_prefix("$.").unwrap_or(path);
        let mut segments = path.split('.');

        let (first_key, first_indices) = split_segment(segments.next()?)?;
        let mut current = index_into(self.root.get(first_key)?, &first_indices)?;
        for segment in segments {
            let (key, indices) = split_segment(segment)?;
            current = index_into(current.as_map()?.get(key)?, &indices)?;
        }
        Some(current)
    }
}

/// `name[1][2]` into `("name", [1, 2])`.
fn split_segment(segment: &str) -> Option<(&str, Vec<usize>)> {
    let (key, mut rest) = match segment.find('[') {
        Some(position) => segment.split_at(position),
        None => return Some((segment, Vec::new())),
    };
    let mut indices = Vec::new();
    while let Some(inner) = rest.strip_prefix('[') {
        let close = inner.find(']')?;
        indices.push(inner[..close].parse().ok()?);
        rest = &inner[close + 1..];
    }
    rest.is_empty().then_some((key, indices))
}

fn index_into<'a>(mut value: &'a RawValue, indices: &[usize]) -> Option<&'a RawValue> {
    for index in indices {
        value = value.as_list()?.get(*index)?;
    }
    Some(value)
}

//! Hierarchical path expressions ("URNs") addressing server objects.
//!
//! # Responsibility
//! - Parse `Type[@Attr='value' and @Id=3]/Child[@Name='x']` into segments.
//! - Render segments back to one canonical string.
//!
//! # Invariants
//! - Text values are single-quoted; a literal quote is written as `''`.
//! - Numeric values are unquoted decimal integers.
//! - Attributes render in name order, so `parse(render(u)) == u`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^([A-Za-z_][A-Za-z0-9_]*)(?:\[(.*)\])?$").expect("valid segment regex")
});
static FILTER_TERM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*@([A-Za-z_][A-Za-z0-9_]*)\s*=\s*('(?:[^']|'')*'|-?[0-9]+)(?:(\s+and\s+)|\s*$)",
    )
    .expect("valid filter term regex")
});

/// Attribute set of one segment, ordered by attribute name.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Errors from path-expression parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrnError {
    Empty,
    InvalidSegment(String),
    InvalidFilter(String),
    DuplicateAttribute(String),
}

impl Display for UrnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "path expression is empty"),
            Self::InvalidSegment(segment) => write!(f, "invalid path segment `{segment}`"),
            Self::InvalidFilter(filter) => write!(f, "invalid attribute filter `{filter}`"),
            Self::DuplicateAttribute(name) => write!(f, "attribute `@{name}` appears twice"),
        }
    }
}

impl Error for UrnError {}

/// One attribute value inside a segment filter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(i64),
    Text(String),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "'{}'", value.replace('\'', "''")),
        }
    }
}

/// Renders an attribute set as a canonical filter body (no brackets).
pub fn render_filter(attributes: &AttributeMap) -> String {
    attributes
        .iter()
        .map(|(name, value)| format!("@{name}={value}"))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Parses a filter body such as `@Name='x' and @ID=4`.
pub fn parse_filter(filter: &str) -> Result<AttributeMap, UrnError> {
    let mut attributes = AttributeMap::new();
    let mut rest = filter;

    loop {
        let captures = FILTER_TERM_RE
            .captures(rest)
            .ok_or_else(|| UrnError::InvalidFilter(filter.to_string()))?;
        let name = captures[1].to_string();
        let value = parse_value(&captures[2])
            .ok_or_else(|| UrnError::InvalidFilter(filter.to_string()))?;
        if attributes.insert(name.clone(), value).is_some() {
            return Err(UrnError::DuplicateAttribute(name));
        }

        let consumed = captures.get(0).map_or(rest.len(), |m| m.end());
        let has_conjunction = captures.get(3).is_some();
        rest = &rest[consumed..];

        match (has_conjunction, rest.is_empty()) {
            (false, true) => return Ok(attributes),
            (true, false) => continue,
            _ => return Err(UrnError::InvalidFilter(filter.to_string())),
        }
    }
}

fn parse_value(raw: &str) -> Option<AttributeValue> {
    if let Some(quoted) = raw.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
        return Some(AttributeValue::Text(quoted.replace("''", "'")));
    }
    raw.parse::<i64>().ok().map(AttributeValue::Number)
}

/// One `Type[filter]` step of a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrnSegment {
    type_name: String,
    attributes: AttributeMap,
}

impl UrnSegment {
    pub fn new(type_name: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            type_name: type_name.into(),
            attributes,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    fn parse(raw: &str) -> Result<Self, UrnError> {
        let captures = SEGMENT_RE
            .captures(raw.trim())
            .ok_or_else(|| UrnError::InvalidSegment(raw.to_string()))?;
        let attributes = match captures.get(2) {
            Some(filter) if !filter.as_str().trim().is_empty() => parse_filter(filter.as_str())?,
            Some(_) => return Err(UrnError::InvalidFilter(raw.to_string())),
            None => AttributeMap::new(),
        };
        Ok(Self::new(&captures[1], attributes))
    }
}

impl Display for UrnSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.attributes.is_empty() {
            write!(f, "{}", self.type_name)
        } else {
            write!(f, "{}[{}]", self.type_name, render_filter(&self.attributes))
        }
    }
}

/// Parsed path expression; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn {
    segments: Vec<UrnSegment>,
}

impl Urn {
    pub fn parse(expression: &str) -> Result<Self, UrnError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(UrnError::Empty);
        }

        let segments = split_segments(trimmed)?
            .into_iter()
            .map(UrnSegment::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Builds a single-segment root path.
    pub fn root(segment: UrnSegment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    pub fn segments(&self) -> &[UrnSegment] {
        &self.segments
    }

    /// Trailing segment; the object this path addresses.
    pub fn last(&self) -> &UrnSegment {
        // `segments` is non-empty by construction.
        &self.segments[self.segments.len() - 1]
    }

    /// Path of the containing object, or `None` for a root path.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns a new path with one child segment appended.
    pub fn child(&self, type_name: impl Into<String>, attributes: AttributeMap) -> Self {
        let mut segments = self.segments.clone();
        segments.push(UrnSegment::new(type_name, attributes));
        Self { segments }
    }
}

impl Display for Urn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Urn {
    type Error = UrnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Urn> for String {
    fn from(value: Urn) -> Self {
        value.to_string()
    }
}

/// Splits on `/` outside of quoted values and filter brackets.
fn split_segments(expression: &str) -> Result<Vec<&str>, UrnError> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_quote = false;

    for (index, ch) in expression.char_indices() {
        match ch {
            '\'' if depth > 0 => in_quote = !in_quote,
            '[' if !in_quote => depth += 1,
            ']' if !in_quote => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| UrnError::InvalidSegment(expression.to_string()))?;
            }
            '/' if !in_quote && depth == 0 => {
                segments.push(&expression[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }

    if in_quote || depth != 0 {
        return Err(UrnError::InvalidSegment(expression.to_string()));
    }
    segments.push(&expression[start..]);
    Ok(segments)
}

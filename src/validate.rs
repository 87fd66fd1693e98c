//! Path gating and attribute validation for candidate rule elements.

use std::collections::{BTreeMap, HashMap};

use crate::parse::{local_name, Attributes};
use crate::{PriorityClass, Record, Rejection};

pub const NAME_ATTR: &str = "name";
pub const TYPE_ATTR: &str = "type";
pub const WEIGHT_ATTR: &str = "weight";

/// The two-segment `container/item` pattern a record element must sit on.
///
/// Only the last two segments of a path are compared, so the container may be
/// nested at any depth, but the item must be its direct child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    container: String,
    item: String,
}

impl Default for PathPattern {
    fn default() -> Self {
        Self::new("rules", "rule")
    }
}

impl PathPattern {
    #[must_use]
    pub fn new(container: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            item: item.into(),
        }
    }

    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Whether a path whose last two segments are `(parent, current)` is a
    /// record position.
    #[must_use]
    pub fn matches(&self, parent: &str, current: &str) -> bool {
        parent == self.container && current == self.item
    }

    /// Whether the path stack currently points at a record position.
    #[must_use]
    pub fn matches_stack(&self, stack: &PathStack) -> bool {
        stack
            .last_two()
            .is_some_and(|(parent, current)| self.matches(parent, current))
    }

    /// Check a slash-separated path such as `/root/rules/rule`. Leading,
    /// trailing, and repeated slashes are ignored.
    #[must_use]
    pub fn matches_str(&self, path: &str) -> bool {
        let mut segments = path.split('/').filter(|s| !s.is_empty()).rev();
        match (segments.next(), segments.next()) {
            (Some(current), Some(parent)) => self.matches(parent, current),
            _ => false,
        }
    }
}

/// Element names from the document root down to the current element.
///
/// Pushed on element enter, popped on element exit. Segments are local names.
#[derive(Debug, Clone, Default)]
pub struct PathStack {
    segments: Vec<String>,
}

impl PathStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: &str) {
        self.segments.push(local_name(segment).to_owned());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn last_two(&self) -> Option<(&str, &str)> {
        match self.segments.as_slice() {
            [.., parent, current] => Some((parent.as_str(), current.as_str())),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_path_string(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Key → value lookup over an element's attributes.
pub trait AttributeLookup {
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl AttributeLookup for Attributes<'_> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

impl AttributeLookup for HashMap<String, String> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl AttributeLookup for BTreeMap<String, String> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl AttributeLookup for [(&str, &str)] {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

impl<const N: usize> AttributeLookup for [(&str, &str); N] {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.as_slice().attribute(name)
    }
}

/// Turn an attribute set into a [`Record`].
///
/// Checks run in order and stop at the first failure: `name` present and
/// non-empty, `type` one of the three classes (case-insensitive), `weight` a
/// strictly positive base-10 integer.
///
/// # Errors
///
/// Returns the [`Rejection`] for the first check that fails.
pub fn validate_record<A: AttributeLookup + ?Sized>(attrs: &A) -> Result<Record, Rejection> {
    let name = attrs.attribute(NAME_ATTR).ok_or(Rejection::MissingName)?;
    if name.is_empty() {
        return Err(Rejection::EmptyName);
    }

    let type_token = attrs.attribute(TYPE_ATTR).ok_or(Rejection::MissingType)?;
    let class = PriorityClass::parse(type_token);
    if !class.is_valid() {
        return Err(Rejection::InvalidType {
            value: type_token.to_owned(),
        });
    }

    let raw_weight = attrs.attribute(WEIGHT_ATTR).ok_or(Rejection::MissingWeight)?;
    let weight: i32 = raw_weight
        .parse()
        .map_err(|_| Rejection::MalformedWeight {
            value: raw_weight.to_owned(),
        })?;
    let weight = u32::try_from(weight)
        .ok()
        .filter(|w| *w > 0)
        .ok_or_else(|| Rejection::NonPositiveWeight {
            value: raw_weight.to_owned(),
        })?;

    Record::new(name, class, weight)
}

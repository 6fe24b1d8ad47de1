//! Reference rewriting over merged definition trees.
//!
//! [`rewrite_value`] is the single recursion point: it walks mappings and
//! sequences, rebuilds them in their original order, and hands every scalar
//! to a [`RewriteRule`].

use std::fmt;

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

/// One step from a tree root to a nested value.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Entered a mapping under this key.
    Key(Value),
    /// Entered a sequence at this position.
    Index(usize),
}

/// Location of the scalar currently being rewritten.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewritePath {
    segments: Vec<Segment>,
}

impl RewritePath {
    /// Steps into a mapping under a string key.
    pub fn push_key(&mut self, key: &str) {
        self.segments.push(Segment::Key(Value::from(key)));
    }

    /// Steps back out of the innermost segment.
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Segments from the root, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The innermost mapping key, if the scalar sits directly under one.
    #[must_use]
    pub fn last_key(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::Key(key)) => key.as_str(),
            _ => None,
        }
    }
}

impl fmt::Display for RewritePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    match key.as_str() {
                        Some(key) => f.write_str(key)?,
                        None => write!(f, "{key:?}")?,
                    }
                }
            }
        }
        Ok(())
    }
}

/// A rewriting rule applied to every scalar leaf.
pub trait RewriteRule {
    /// Returns the replacement for the scalar `value` found at `path`.
    fn rewrite_scalar(&mut self, path: &RewritePath, value: Value) -> Value;
}

/// Leaves every scalar untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl RewriteRule for Identity {
    fn rewrite_scalar(&mut self, _path: &RewritePath, value: Value) -> Value {
        value
    }
}

/// Rebuilds `value`, passing each scalar through `rule`.
///
/// Mapping keys are kept as-is and in their original order; sequences keep
/// their length and order; tags are preserved.
pub fn rewrite_value(value: Value, path: &mut RewritePath, rule: &mut dyn RewriteRule) -> Value {
    match value {
        Value::Mapping(mapping) => {
            let mut rewritten = Mapping::with_capacity(mapping.len());
            for (key, child) in mapping {
                path.segments.push(Segment::Key(key.clone()));
                let child = rewrite_value(child, path, rule);
                path.pop();
                rewritten.insert(key, child);
            }
            Value::Mapping(rewritten)
        }
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(index, child)| {
                    path.segments.push(Segment::Index(index));
                    let child = rewrite_value(child, path, rule);
                    path.pop();
                    child
                })
                .collect(),
        ),
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            let value = rewrite_value(value, path, rule);
            Value::Tagged(Box::new(TaggedValue { tag, value }))
        }
        scalar @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) => {
            rule.rewrite_scalar(path, scalar)
        }
    }
}

//! Compilation units.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use serde_json::Value;

/// Bound for anything the selector can schedule.
///
/// The selector never looks inside a rep: it only clones, compares and hashes
/// it. `Display` is used as the unit description when a dependency cycle is
/// rendered. Implemented automatically for every type meeting the bounds, so
/// plain `&'static str` names work in tests.
pub trait Rep: Clone + Eq + Hash + Debug + Display + 'static {}

impl<T: Clone + Eq + Hash + Debug + Display + 'static> Rep for T {}

/// Identifier of an item, e.g. `/about.md`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Name of a representation, e.g. `default` or `text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepName(pub String);

impl RepName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One representation of one item: the unit of compilation.
///
/// Renders as `item /foo.md, rep :default`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRep {
    pub item: Identifier,
    pub name: RepName,
}

impl ItemRep {
    pub fn new(item: impl Into<Identifier>, name: impl Into<RepName>) -> Self {
        Self {
            item: item.into(),
            name: name.into(),
        }
    }
}

impl Display for ItemRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {}, rep :{}", self.item, self.name)
    }
}

/// A piece of site content: identifier, raw content and attributes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub identifier: Identifier,
    pub content: String,
    pub attributes: BTreeMap<String, Value>,
}

impl Item {
    pub fn new(content: impl Into<String>, identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            content: content.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Representation `name` of this item.
    pub fn rep(&self, name: impl Into<RepName>) -> ItemRep {
        ItemRep {
            item: self.identifier.clone(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_rep_display() {
        let rep = ItemRep::new("/foo.md", "a");
        assert_eq!(rep.to_string(), "item /foo.md, rep :a");
    }

    #[test]
    fn test_item_rep_identity() {
        let item = Item::new("stuff", "/foo.md");
        assert_eq!(item.rep("a"), ItemRep::new("/foo.md", "a"));
        assert_ne!(item.rep("a"), item.rep("b"));
    }
}

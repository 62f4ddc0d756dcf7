//! Read-tracking views over item collections.
//!
//! Compile code reaches other items through an [`IdentifiableCollectionView`].
//! Every read is reported to a [`DependencyTracker`] with the narrowest
//! description of what was read ([`DependencyProps`]): all raw content, only
//! the items matching a pattern, or only some attribute values. A later run
//! can compare those records against what changed to decide outdatedness.

use std::fmt;

use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;

use crate::rep::{Identifier, Item};
use crate::signal::NeedKind;

/// An object with an identifier and attributes.
pub trait Identifiable {
    fn identifier(&self) -> &Identifier;

    fn attribute(&self, key: &str) -> Option<&Value>;
}

impl Identifiable for Item {
    fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Identifier pattern used to look items up.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches one identifier exactly.
    Exact(String),
    /// Glob over identifiers: `*` and `?` stop at `/`, `**` does not, and
    /// `{a,b}` is an alternation. `source` is the glob as written.
    Glob { source: String, regex: Regex },
    /// Regular expression over identifiers.
    Regex(Regex),
}

impl Pattern {
    /// Exact match for strings without glob metacharacters, glob otherwise.
    pub fn from_string(s: &str) -> Result<Self, regex::Error> {
        if s.contains(['*', '?', '{']) {
            Self::glob(s)
        } else {
            Ok(Pattern::Exact(s.to_string()))
        }
    }

    pub fn glob(glob: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&glob_to_regex(glob))?;
        Ok(Pattern::Glob {
            source: glob.to_string(),
            regex,
        })
    }

    pub fn regex(regex: Regex) -> Self {
        Pattern::Regex(regex)
    }

    pub fn matches(&self, identifier: &str) -> bool {
        match self {
            Pattern::Exact(s) => s == identifier,
            Pattern::Glob { regex, .. } | Pattern::Regex(regex) => regex.is_match(identifier),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(s) => f.write_str(s),
            Pattern::Glob { source, .. } => f.write_str(source),
            Pattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Pattern::Exact(a), Pattern::Exact(b)) => a == b,
            (Pattern::Glob { source: a, .. }, Pattern::Glob { source: b, .. }) => a == b,
            (Pattern::Regex(a), Pattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("^");
    let mut chars = glob.chars().peekable();
    let mut in_braces = false;

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '{' => {
                in_braces = true;
                out.push_str("(?:");
            }
            '}' if in_braces => {
                in_braces = false;
                out.push(')');
            }
            ',' if in_braces => out.push('|'),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }

    out.push('$');
    out
}

/// How much of an item's raw content was read.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawContentProp {
    #[default]
    None,
    /// Only items matching one of the patterns.
    Patterns(Vec<Pattern>),
    All,
}

/// Which attributes were read.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributesProp {
    #[default]
    None,
    /// Any value of these keys.
    Keys(Vec<String>),
    /// These exact key/value pairs.
    Pairs(Vec<(String, Value)>),
    All,
}

/// Description of one read of a collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DependencyProps {
    pub raw_content: RawContentProp,
    pub attributes: AttributesProp,
    pub compiled_content: bool,
    pub path: bool,
}

impl DependencyProps {
    pub fn raw_content() -> Self {
        Self {
            raw_content: RawContentProp::All,
            ..Self::default()
        }
    }

    pub fn raw_content_matching(patterns: Vec<Pattern>) -> Self {
        Self {
            raw_content: RawContentProp::Patterns(patterns),
            ..Self::default()
        }
    }

    pub fn attribute_pairs(pairs: Vec<(String, Value)>) -> Self {
        Self {
            attributes: AttributesProp::Pairs(pairs),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Combine two reads of the same target; the result covers both.
    pub fn merge(&self, other: &Self) -> Self {
        let raw_content = match (&self.raw_content, &other.raw_content) {
            (RawContentProp::All, _) | (_, RawContentProp::All) => RawContentProp::All,
            (RawContentProp::None, x) | (x, RawContentProp::None) => x.clone(),
            (RawContentProp::Patterns(a), RawContentProp::Patterns(b)) => {
                let mut patterns = a.clone();
                for p in b {
                    if !patterns.contains(p) {
                        patterns.push(p.clone());
                    }
                }
                RawContentProp::Patterns(patterns)
            }
        };

        let attributes = match (&self.attributes, &other.attributes) {
            (AttributesProp::All, _) | (_, AttributesProp::All) => AttributesProp::All,
            (AttributesProp::None, x) | (x, AttributesProp::None) => x.clone(),
            (AttributesProp::Pairs(a), AttributesProp::Pairs(b)) => {
                let mut pairs = a.clone();
                for pair in b {
                    if !pairs.contains(pair) {
                        pairs.push(pair.clone());
                    }
                }
                AttributesProp::Pairs(pairs)
            }
            (a, b) => {
                let mut keys = attribute_keys(a);
                for key in attribute_keys(b) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                AttributesProp::Keys(keys)
            }
        };

        Self {
            raw_content,
            attributes,
            compiled_content: self.compiled_content || other.compiled_content,
            path: self.path || other.path,
        }
    }

    /// The most specific need these props amount to.
    pub fn need_kind(&self) -> NeedKind {
        if self.compiled_content {
            NeedKind::CompiledContent
        } else if self.path {
            NeedKind::Path
        } else if self.attributes != AttributesProp::None {
            NeedKind::Attributes
        } else {
            NeedKind::RawContent
        }
    }
}

fn attribute_keys(prop: &AttributesProp) -> Vec<String> {
    match prop {
        AttributesProp::Keys(keys) => keys.clone(),
        AttributesProp::Pairs(pairs) => pairs.iter().map(|(k, _)| k.clone()).collect(),
        AttributesProp::None | AttributesProp::All => Vec::new(),
    }
}

/// Which collection a view wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionKind {
    Items,
    Layouts,
}

/// Receives every read made through a view.
pub trait DependencyTracker {
    fn bounce(&self, collection: CollectionKind, props: DependencyProps);
}

/// Tracker that ignores reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTracker;

impl DependencyTracker for NullTracker {
    fn bounce(&self, _collection: CollectionKind, _props: DependencyProps) {}
}

/// Tracker that keeps every read, in order.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    reads: Mutex<Vec<(CollectionKind, DependencyProps)>>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded reads.
    pub fn reads(&self) -> Vec<(CollectionKind, DependencyProps)> {
        self.reads.lock().clone()
    }

    /// Reads of `collection`, merged into one description.
    pub fn merged(&self, collection: CollectionKind) -> DependencyProps {
        self.reads
            .lock()
            .iter()
            .filter(|(kind, _)| *kind == collection)
            .fold(DependencyProps::default(), |acc, (_, props)| acc.merge(props))
    }

    /// Take recorded reads, clearing the tracker.
    pub fn take(&self) -> Vec<(CollectionKind, DependencyProps)> {
        std::mem::take(&mut *self.reads.lock())
    }
}

impl DependencyTracker for RecordingTracker {
    fn bounce(&self, collection: CollectionKind, props: DependencyProps) {
        self.reads.lock().push((collection, props));
    }
}

/// Read-tracking view over a collection of identifiable objects.
pub struct IdentifiableCollectionView<'a, T, D: ?Sized> {
    objects: &'a [T],
    kind: CollectionKind,
    tracker: &'a D,
}

impl<'a, T: Identifiable, D: DependencyTracker + ?Sized> IdentifiableCollectionView<'a, T, D> {
    pub fn new(objects: &'a [T], kind: CollectionKind, tracker: &'a D) -> Self {
        Self {
            objects,
            kind,
            tracker,
        }
    }

    /// Iterate over all objects. Depends on all raw content.
    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.bounce(DependencyProps::raw_content());
        self.objects.iter()
    }

    /// Number of objects. Depends on all raw content.
    pub fn len(&self) -> usize {
        self.bounce(DependencyProps::raw_content());
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Objects whose identifier matches `pattern`.
    pub fn find_all(&self, pattern: &Pattern) -> Vec<&'a T> {
        self.bounce(DependencyProps::raw_content_matching(vec![pattern.clone()]));
        self.objects
            .iter()
            .filter(|o| pattern.matches(o.identifier().as_str()))
            .collect()
    }

    /// Objects accepted by `predicate`. The predicate may look at anything,
    /// so this depends on all raw content.
    pub fn find_all_by<P>(&self, mut predicate: P) -> Vec<&'a T>
    where
        P: FnMut(&T) -> bool,
    {
        self.bounce(DependencyProps::raw_content());
        self.objects.iter().filter(|o| predicate(*o)).collect()
    }

    /// Objects having every one of the given attribute values.
    pub fn where_attributes(&self, pairs: &[(&str, Value)]) -> Vec<&'a T> {
        self.bounce(DependencyProps::attribute_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ));
        self.objects
            .iter()
            .filter(|o| pairs.iter().all(|(k, v)| o.attribute(k) == Some(v)))
            .collect()
    }

    /// First object whose identifier matches `pattern`.
    pub fn get(&self, pattern: &Pattern) -> Option<&'a T> {
        self.bounce(DependencyProps::raw_content_matching(vec![pattern.clone()]));
        self.objects
            .iter()
            .find(|o| pattern.matches(o.identifier().as_str()))
    }

    fn bounce(&self, props: DependencyProps) {
        self.tracker.bounce(self.kind, props);
    }
}

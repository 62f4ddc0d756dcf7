//! The "dependency not ready yet" signal.

use std::fmt;

/// What part of another rep an attempt needed.
///
/// Opaque to the selector; it only flows into cycle reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeedKind {
    /// The item's uncompiled content.
    RawContent,
    /// One or more of the item's attributes.
    Attributes,
    /// The rep's compiled content (some snapshot of it).
    #[default]
    CompiledContent,
    /// The rep's output path.
    Path,
}

impl fmt::Display for NeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NeedKind::RawContent => "raw content",
            NeedKind::Attributes => "attributes",
            NeedKind::CompiledContent => "compiled content",
            NeedKind::Path => "path",
        })
    }
}

/// Raised by a compile attempt that touched output of a rep which has not
/// been compiled yet.
///
/// A control signal consumed by [`RepSelector`](crate::RepSelector), not an
/// error. It must not implement `std::error::Error`, so it never converts
/// into an `anyhow::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnmetDependency<R> {
    /// The rep whose output is needed.
    pub rep: R,
    /// What was needed from it.
    pub need: NeedKind,
}

impl<R> UnmetDependency<R> {
    pub fn new(rep: R, need: NeedKind) -> Self {
        Self { rep, need }
    }

    /// Shorthand for the common case of needing compiled content.
    pub fn compiled_content(rep: R) -> Self {
        Self::new(rep, NeedKind::CompiledContent)
    }
}

impl<R: fmt::Display> fmt::Display for UnmetDependency<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unmet dependency on {} ({})", self.rep, self.need)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_need_kind_display() {
        assert_eq!(NeedKind::default().to_string(), "compiled content");
        assert_eq!(NeedKind::RawContent.to_string(), "raw content");
        assert_eq!(NeedKind::Attributes.to_string(), "attributes");
        assert_eq!(NeedKind::Path.to_string(), "path");
    }

    #[test]
    fn test_unmet_dependency_display() {
        let unmet = UnmetDependency::new("b", NeedKind::Path);
        assert_eq!(unmet.to_string(), "unmet dependency on b (path)");
    }
}

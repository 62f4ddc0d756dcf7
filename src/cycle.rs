//! Dependency cycle reports.

use std::fmt;

use crate::rep::Rep;
use crate::signal::NeedKind;

/// One link of a cycle: `rep` uses `need` of the next entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleEntry<R> {
    pub rep: R,
    pub need: NeedKind,
}

/// A circular wait between reps, found on the selector's active chain.
///
/// The first entry is the rep that closes the loop: the last entry uses
/// something of the first one. Its `Display` output is the user-facing
/// diagnostic:
///
/// ```text
/// The site cannot be compiled because there is a dependency cycle:
///
///     (1) item /foo.md, rep :a, uses compiled content of
///     (2) item /foo.md, rep :b, uses compiled content of
///     (3) item /foo.md, rep :c, uses compiled content of (1)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCycle<R> {
    entries: Vec<CycleEntry<R>>,
}

impl<R> DependencyCycle<R> {
    /// Build a report from the chain segment starting at the repeated rep.
    ///
    /// `entries` must not be empty.
    pub fn new(entries: Vec<CycleEntry<R>>) -> Self {
        debug_assert!(!entries.is_empty(), "a cycle has at least one entry");
        Self { entries }
    }

    pub fn entries(&self) -> &[CycleEntry<R>] {
        &self.entries
    }

    /// Reps in the cycle, in chain order.
    pub fn reps(&self) -> impl Iterator<Item = &R> {
        self.entries.iter().map(|entry| &entry.rep)
    }

    /// The rep found twice on the chain.
    pub fn closing_rep(&self) -> Option<&R> {
        self.entries.first().map(|entry| &entry.rep)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Rep> fmt::Display for DependencyCycle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "The site cannot be compiled because there is a dependency cycle:"
        )?;
        writeln!(f)?;

        let last = self.entries.len().saturating_sub(1);
        for (i, entry) in self.entries.iter().enumerate() {
            write!(f, "    ({}) {}, uses {} of", i + 1, entry.rep, entry.need)?;
            if i == last {
                // The report starts at the repeated rep.
                write!(f, " (1)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<R: Rep> std::error::Error for DependencyCycle<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rep::ItemRep;

    #[test]
    fn test_single_entry_rendering() {
        let cycle = DependencyCycle::new(vec![CycleEntry {
            rep: ItemRep::new("/foo.md", "a"),
            need: NeedKind::CompiledContent,
        }]);

        assert_eq!(
            cycle.to_string(),
            "The site cannot be compiled because there is a dependency cycle:\n\
             \n    (1) item /foo.md, rep :a, uses compiled content of (1)\n"
        );
    }

    #[test]
    fn test_mixed_need_rendering() {
        let cycle = DependencyCycle::new(vec![
            CycleEntry {
                rep: "x",
                need: NeedKind::Attributes,
            },
            CycleEntry {
                rep: "y",
                need: NeedKind::Path,
            },
        ]);

        let expected = "The site cannot be compiled because there is a dependency cycle:\n\
                        \n    (1) x, uses attributes of\n    (2) y, uses path of (1)\n";
        assert_eq!(cycle.to_string(), expected);
        assert_eq!(cycle.closing_rep(), Some(&"x"));
        assert_eq!(cycle.reps().copied().collect::<Vec<_>>(), vec!["x", "y"]);
    }
}

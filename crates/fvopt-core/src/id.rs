//! Strongly-typed identifiers.

use std::fmt;

/// Monotonically increasing time-step counter.
///
/// Supplied by the mesh (the solver's time database). A change in the
/// observed index marks the start of a new step: coefficient caches are
/// invalidated and option bookkeeping is validated and cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeIndex(pub u64);

impl TimeIndex {
    /// The index of the following step.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TimeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TimeIndex {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments() {
        assert_eq!(TimeIndex(4).next(), TimeIndex(5));
        assert!(TimeIndex(4) < TimeIndex(4).next());
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(TimeIndex::from(17).to_string(), "17");
    }
}

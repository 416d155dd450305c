//! The combinator tagging a rule's composition rule.

use serde::{Deserialize, Serialize};

/// How a rule's children combine to count the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    /// Sum: `#parent(n) = sum of #child_i(n)`.
    Disjoint,
    /// Product: `#parent(n) = sum over compositions of n into k parts of
    /// the product of `#child_i(part_i)``.
    Cartesian,
}

impl Combinator {
    /// The lowercase name used in formal-step text and serialized output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::Disjoint => "disjoint",
            Combinator::Cartesian => "cartesian",
        }
    }
}

impl std::fmt::Display for Combinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

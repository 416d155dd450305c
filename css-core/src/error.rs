//! Typed, recoverable core errors.
//!
//! Per `spec.md` §7, programmer misuse (missing start class, wrong pack
//! type, a strategy returning a non-strategy object) fails loudly and
//! immediately — those cases are either made unrepresentable by the type
//! system (see DESIGN.md) or surfaced as a panic via `expect`/`assert!`,
//! not through this enum. `CoreError` covers the boundary queries whose
//! preconditions a caller can legitimately fail to satisfy (e.g. asking for
//! a path between labels that are not yet known to be equivalent).

use crate::label::Label;

/// A recoverable failure from a `css-core` database query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// `EquivDb::find_path`/`get_explanation` called on labels not (yet)
    /// united.
    NotEquivalent { u: Label, v: Label },
    /// `EquivDb::get_explanation(u, v, one_step = true)` called on a pair
    /// with no direct union edge, even though they may be equivalent via a
    /// longer chain.
    NoDirectExplanation { u: Label, v: Label },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::NotEquivalent { u, v } => {
                write!(f, "{u} and {v} are not in the same equivalence set")
            }
            CoreError::NoDirectExplanation { u, v } => {
                write!(f, "no direct explanation edge between {u} and {v}")
            }
        }
    }
}

impl std::error::Error for CoreError {}

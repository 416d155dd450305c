//! Driver-level configuration that sits outside the strategy pack itself.

use std::time::Duration;

use crate::error::SearchError;

/// Policy knobs for a single [`crate::driver::SearchDriver`].
///
/// `sanity_check_length` corresponds to `spec.md` §7's debug-mode sanity
/// check: when set, every rule inserted into the rule db is immediately
/// checked (at this length) against the object counts its children report,
/// with a mismatch logged as a warning rather than rejected — a buggy
/// strategy should not silently corrupt later search state, but it also
/// should not abort a search that is otherwise making progress.
#[derive(Debug, Clone, Default)]
pub struct SearchPolicy {
    pub sanity_check_length: Option<usize>,
}

/// Configuration for [`crate::driver::SearchDriver::auto_search`].
///
/// `spec.md` §4.8: repeatedly expand for a time budget, attempt
/// `find_tree`, and on failure multiply the budget by `cap` up to a
/// ceiling of one hour, stopping on success, on `max_time`, or when the
/// queue empties.
#[derive(Debug, Clone, Copy)]
pub struct AutoSearchConfig {
    /// Growth factor applied to the per-round expansion budget after each
    /// failed `find_tree` attempt. Must be greater than `1.0`.
    pub cap: f64,
    /// Total wall-clock time `auto_search` is allowed to run before giving
    /// up and returning `Ok(None)`.
    pub max_time: Duration,
    /// The per-round budget never grows past this, regardless of `cap`
    /// (`spec.md` §4.8's "up to 1 h").
    pub hard_cap: Duration,
    /// The starting per-round expansion budget.
    pub initial_budget: Duration,
}

impl Default for AutoSearchConfig {
    fn default() -> Self {
        Self {
            cap: 2.0,
            max_time: Duration::from_secs(3600),
            hard_cap: Duration::from_secs(3600),
            initial_budget: Duration::from_millis(100),
        }
    }
}

impl AutoSearchConfig {
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidCap`] if `cap <= 1.0`.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.cap <= 1.0 {
            return Err(SearchError::InvalidCap(self.cap));
        }
        Ok(())
    }
}

//! Configuration errors the driver can detect ahead of time.
//!
//! `spec.md` §7 lists several "misuse" cases (wrong pack type, inferring
//! with a multi-child rule, verifying with a non-verification strategy) —
//! in this crate those are unrepresentable rather than runtime-checked:
//! [`css_core::strategy::InferralStrategy::infer`] can only ever return a
//! single child, and [`css_core::strategy::VerificationStrategy`] is a
//! distinct trait from [`css_core::strategy::Strategy`], so neither misuse
//! can be expressed in the first place. What remains here is genuine
//! runtime-checkable configuration.

use std::fmt;

/// An error in a driver's configuration, checked before a search runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchError {
    /// [`crate::policy::AutoSearchConfig::cap`] must exceed `1.0`, or the
    /// time budget used by [`crate::driver::SearchDriver::auto_search`]
    /// never grows.
    InvalidCap(f64),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidCap(cap) => {
                write!(f, "auto_search cap must be greater than 1.0, got {cap}")
            }
        }
    }
}

impl std::error::Error for SearchError {}

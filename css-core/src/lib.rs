//! css-core: the deterministic data model of the specification searcher.
//!
//! # Module dependency direction
//!
//! `label` ← `class` ← `combinator`/`strategy` ← `classdb`/`equivdb`/`ruledb`
//!
//! This crate owns no search policy and no orchestration: it is the shared
//! vocabulary (labels, the class/equivalence/rule databases, and the
//! strategy data model) that `css-tree` and `css-search` build on. Nothing
//! here runs a search loop or decides what to expand next.
//!
//! # API surface
//!
//! - [`label::Label`] — dense per-class identifier
//! - [`classdb::ClassDb`] — canonical labelling + per-label metadata
//! - [`equivdb::EquivDb`] — union-find with explanation reconstruction
//! - [`ruledb::RuleDb`] — the rule hypergraph
//! - [`class::CombinatorialClass`] — the capability set a caller's class type
//!   must provide
//! - [`strategy`] — the strategy/strategy-pack data model

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod class;
pub mod classdb;
pub mod combinator;
pub mod equivdb;
pub mod error;
pub mod label;
pub mod ruledb;
pub mod strategy;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

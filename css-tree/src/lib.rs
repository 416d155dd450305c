//! css-tree: turning a rule hypergraph into a finite proof that a root
//! label is fully understood.
//!
//! Builds on [`css_core`]'s class/equivalence/rule databases without
//! mutating them (beyond the union-find's own path compression): this
//! crate only reads `ClassDb`/`EquivDb`/`RuleDb` and produces a
//! [`proof_tree::ProofTree`].
//!
//! # Pipeline
//!
//! 1. [`rule_dict::build_rule_dict`] rewrites every rule's parent/children
//!    through [`css_core::equivdb::EquivDb::representative`] and adds an
//!    artificial empty-children rule for every verified representative.
//! 2. [`prune::prune`] (or [`prune::iterative_prune`]) computes the
//!    greatest fixed point of labels with a finite derivation.
//! 3. [`extract::proof_tree_bfs`] walks the restricted dictionary from a
//!    root label, picking at each point the shallowest available
//!    alternative, to produce one concrete [`proof_tree::ProofTree`].
//!
//! [`extract::find_tree`] runs all three steps in one call.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod counting;
pub mod extract;
pub mod proof_tree;
pub mod prune;
pub mod rule_dict;

pub use extract::find_tree;
pub use proof_tree::{CountMismatch, NodeKind, ProofTree, ProofTreeNode};

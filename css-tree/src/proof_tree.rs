//! The extracted proof tree: a finite, acyclic (except for explicit
//! recursion leaves) witness that the root label is fully understood.

use serde::{Deserialize, Serialize};

use css_core::class::CombinatorialClass;
use css_core::classdb::ClassDb;
use css_core::label::Label;

use crate::counting::compositions;

/// What combined a node's children into its own count, or why it has none.
///
/// Matches `spec.md` §3/§6's four proof-tree node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A leaf verified directly by a strategy (including emptiness).
    StrategyVerified,
    /// `#parent(n) = sum of #child_i(n)`.
    DisjointUnion,
    /// `#parent(n) = sum over compositions of the product of child counts`.
    Decomposition,
    /// A leaf pointing back at an ancestor's equivalence class; the
    /// specification is self-referential at this point rather than
    /// terminating.
    Recursion,
}

/// One node of the extracted proof tree.
///
/// `eqv_path_labels`/`eqv_path_explanations` record the chain of equivalence
/// steps from this node's representative label down to the concrete label
/// the chosen rule actually decomposed, recovered via
/// [`css_core::equivdb::EquivDb::find_path`]/`explain_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofTreeNode {
    pub label: Label,
    pub eqv_path_labels: Vec<Label>,
    pub eqv_path_explanations: Vec<String>,
    pub formal_step: String,
    pub kind: NodeKind,
    pub children: Vec<ProofTreeNode>,
}

impl ProofTreeNode {
    /// Height of the subtree rooted here: zero for a leaf.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(ProofTreeNode::depth)
            .max()
            .map_or(0, |d| d + 1)
    }

    /// Every node in the subtree, including this one.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &ProofTreeNode> + '_> {
        Box::new(
            std::iter::once(self).chain(self.children.iter().flat_map(ProofTreeNode::iter)),
        )
    }
}

/// A complete extracted proof tree, rooted at the label [`crate::extract::find_tree`]
/// was asked to explain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofTree {
    pub root: ProofTreeNode,
}

/// A single counting identity that failed to hold during
/// [`ProofTree::sanity_check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMismatch {
    pub label: Label,
    pub length: usize,
    pub expected: u64,
    pub actual: u64,
    pub detail: String,
}

impl ProofTree {
    /// Recompute, at object-count size `length`, every node's counting
    /// identity against the classes named by `classdb`, returning every
    /// mismatch found.
    ///
    /// This is `spec.md` §8 testable property 7: along every node, the
    /// counts of a `DisjointUnion`'s children must sum to its own count, and
    /// a `Decomposition`'s children must satisfy the composition-product
    /// identity. `StrategyVerified` and `Recursion` leaves carry no
    /// constraint of their own beyond the equivalence path agreeing on a
    /// single count.
    #[must_use]
    pub fn sanity_check<C: CombinatorialClass>(
        &self,
        classdb: &ClassDb<C>,
        length: usize,
    ) -> Vec<CountMismatch> {
        let mut mismatches = Vec::new();
        check_node(&self.root, classdb, length, &mut mismatches);
        mismatches
    }
}

fn count_of<C: CombinatorialClass>(classdb: &ClassDb<C>, label: Label, length: usize) -> u64 {
    classdb.get_class(label).objects_of_length(length).len() as u64
}

fn check_node<C: CombinatorialClass>(
    node: &ProofTreeNode,
    classdb: &ClassDb<C>,
    length: usize,
    mismatches: &mut Vec<CountMismatch>,
) {
    let own = count_of(classdb, node.label, length);
    for &step_label in &node.eqv_path_labels {
        let at_step = count_of(classdb, step_label, length);
        if at_step != own {
            mismatches.push(CountMismatch {
                label: node.label,
                length,
                expected: own,
                actual: at_step,
                detail: format!(
                    "equivalence path member {step_label} disagrees with representative {}",
                    node.label
                ),
            });
        }
    }

    match node.kind {
        NodeKind::StrategyVerified | NodeKind::Recursion => {}
        NodeKind::DisjointUnion => {
            let total: u64 = node.children.iter().map(|c| count_of(classdb, c.label, length)).sum();
            if total != own {
                mismatches.push(CountMismatch {
                    label: node.label,
                    length,
                    expected: own,
                    actual: total,
                    detail: "disjoint union of children does not sum to parent".to_string(),
                });
            }
        }
        NodeKind::Decomposition => {
            let k = node.children.len();
            let mut total = 0u64;
            for parts in compositions(length, k) {
                let mut product = 1u64;
                for (child, &part) in node.children.iter().zip(parts.iter()) {
                    product *= count_of(classdb, child.label, part);
                }
                total += product;
            }
            if total != own {
                mismatches.push(CountMismatch {
                    label: node.label,
                    length,
                    expected: own,
                    actual: total,
                    detail: "cartesian product of children does not match parent".to_string(),
                });
            }
        }
    }

    for child in &node.children {
        check_node(child, classdb, length, mismatches);
    }
}

//! Extracting a single, finite proof tree from a pruned rule dictionary.

use css_core::class::CombinatorialClass;
use css_core::classdb::ClassDb;
use css_core::combinator::Combinator;
use css_core::equivdb::EquivDb;
use css_core::label::Label;
use css_core::ruledb::RuleDb;

use crate::prune::{iterative_prune, prune, restrict};
use crate::proof_tree::{NodeKind, ProofTree, ProofTreeNode};
use crate::rule_dict::{build_rule_dict, RewrittenRule, RewrittenRuleDict};

/// Build the rewritten rule dictionary, prune it, and extract a proof tree
/// rooted at `root`, in one call.
///
/// `spec.md` §4.7/§7: returning `None` is a normal outcome, not an error —
/// it means no finite, fully-verified derivation of `root` exists yet (or,
/// in `iterative` mode, none exists that avoids every back-edge). The
/// caller is expected to keep searching and try again later.
pub fn find_tree<C: CombinatorialClass>(
    root: Label,
    ruledb: &RuleDb,
    classdb: &ClassDb<C>,
    equivdb: &mut EquivDb,
    iterative: bool,
) -> Option<ProofTree> {
    let dict = build_rule_dict(ruledb, classdb, equivdb);
    let root_rep = equivdb.representative(root);

    let p = if iterative {
        iterative_prune(&dict, root_rep)
    } else {
        prune(&dict)
    };
    if !p.contains(&root_rep) {
        return None;
    }

    let restricted = restrict(&dict, &p);
    proof_tree_bfs(root_rep, &restricted, equivdb, iterative)
}

/// Extract a proof tree from an already-restricted rule dictionary.
///
/// `rule_dict` must already be restricted to labels that admit a finite
/// derivation (the output of [`crate::prune::restrict`]) — every candidate
/// rule considered here is guaranteed to bottom out eventually, so the only
/// way extraction can still fail in `iterative` mode is every alternative
/// at some label requiring a back-edge to a live ancestor.
#[must_use]
pub fn proof_tree_bfs(
    root: Label,
    rule_dict: &RewrittenRuleDict,
    equivdb: &mut EquivDb,
    iterative: bool,
) -> Option<ProofTree> {
    let mut ancestors = Vec::new();
    extract(root, rule_dict, equivdb, &mut ancestors, iterative)
        .map(|root_node| ProofTree { root: root_node })
}

fn extract(
    label: Label,
    rule_dict: &RewrittenRuleDict,
    equivdb: &mut EquivDb,
    ancestors: &mut Vec<Label>,
    iterative: bool,
) -> Option<ProofTreeNode> {
    let candidates = rule_dict.get(&label)?;

    if let Some(verified) = candidates.iter().find(|r| r.children.is_empty()) {
        return Some(build_node(label, verified, Vec::new(), NodeKind::StrategyVerified, equivdb));
    }

    ancestors.push(label);
    let mut best: Option<(usize, ProofTreeNode)> = None;

    'candidates: for rule in candidates {
        if iterative && rule.children.iter().any(|c| ancestors.contains(c)) {
            continue;
        }

        let mut child_nodes = Vec::with_capacity(rule.children.len());
        for &child in &rule.children {
            if ancestors.contains(&child) {
                child_nodes.push(recursion_leaf(child));
                continue;
            }
            match extract(child, rule_dict, equivdb, ancestors, iterative) {
                Some(node) => child_nodes.push(node),
                None => continue 'candidates,
            }
        }

        let depth = child_nodes
            .iter()
            .map(ProofTreeNode::depth)
            .max()
            .map_or(0, |d| d + 1);
        let kind = match rule.combinator {
            Combinator::Disjoint => NodeKind::DisjointUnion,
            Combinator::Cartesian => NodeKind::Decomposition,
        };
        // Prefer the alternative with the smallest resulting depth, keeping
        // the first of any tie (candidates are walked in insertion order).
        let better = match &best {
            Some((best_depth, _)) => depth < *best_depth,
            None => true,
        };
        if better {
            let node = build_node(label, rule, child_nodes, kind, equivdb);
            best = Some((depth, node));
        }
    }

    ancestors.pop();
    best.map(|(_, node)| node)
}

fn build_node(
    label: Label,
    rule: &RewrittenRule,
    children: Vec<ProofTreeNode>,
    kind: NodeKind,
    equivdb: &mut EquivDb,
) -> ProofTreeNode {
    let eqv_path_labels = equivdb
        .find_path(label, rule.original_parent)
        .expect("a rule stored under this representative must be reachable from it");
    let eqv_path_explanations = equivdb
        .explain_path(label, rule.original_parent)
        .expect("find_path above already succeeded");
    ProofTreeNode {
        label,
        eqv_path_labels,
        eqv_path_explanations,
        formal_step: rule.formal_step.clone(),
        kind,
        children,
    }
}

fn recursion_leaf(label: Label) -> ProofTreeNode {
    ProofTreeNode {
        label,
        eqv_path_labels: vec![label],
        eqv_path_explanations: Vec::new(),
        formal_step: format!("Recurse into {label}."),
        kind: NodeKind::Recursion,
        children: Vec::new(),
    }
}

//! The greatest-fixed-point computation that decides which labels admit a
//! finite, fully-verified derivation.
//!
//! `spec.md` §4.7. A label is in `P` once it has a rule (possibly the
//! artificial empty-children one built by
//! [`crate::rule_dict::build_rule_dict`] for a verified label) whose
//! children are all already in `P`. `P` is the *greatest* such set, reached
//! by monotonically growing a lower bound until it stops changing.
//!
//! A rule's own parent is allowed to appear among its own children for
//! free: such an occurrence is a direct back-edge, the case `spec.md`'s
//! recursion scenario describes (a rule `A -> (A, B)` where `B` independently
//! verifies), and the BFS extractor turns it into a `RECURSION` leaf rather
//! than re-deriving `A`. A rule is only admitted this way if it has at least
//! one *other* child once the self-occurrences are discounted — a rule that
//! recurses into nothing but itself has no escape and is never admitted, no
//! matter how long the fixed point runs. Indirect cycles between two or more
//! distinct labels get no such discount here; those remain the job of the
//! extractor's ancestor-stack tracking during a single extraction attempt.

use std::collections::HashSet;

use css_core::label::Label;

use crate::rule_dict::RewrittenRuleDict;

/// The greatest fixed point: every representative label with a finite,
/// fully-verified derivation somewhere in `rule_dict`.
#[must_use]
pub fn prune(rule_dict: &RewrittenRuleDict) -> HashSet<Label> {
    let mut p: HashSet<Label> = rule_dict
        .iter()
        .filter(|(_, rules)| rules.iter().any(|r| r.children.is_empty()))
        .map(|(&parent, _)| parent)
        .collect();

    loop {
        let mut changed = false;
        for (&parent, rules) in rule_dict {
            if p.contains(&parent) {
                continue;
            }
            if rules.iter().any(|r| rule_qualifies(parent, r, &p)) {
                p.insert(parent);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    p
}

/// Does `rule` (belonging to `parent`) qualify `parent` for membership in
/// `p`, given `p`'s current state? Occurrences of `parent` among the rule's
/// own children are discounted, provided some other child remains.
fn rule_qualifies(parent: Label, rule: &crate::rule_dict::RewrittenRule, p: &HashSet<Label>) -> bool {
    if rule.children.is_empty() {
        return true;
    }
    let mut others = rule.children.iter().filter(|&&c| c != parent).peekable();
    others.peek().is_some() && others.all(|c| p.contains(c))
}

/// As [`prune`], but first discards every candidate rule whose children
/// include `root` itself.
///
/// This is the cheap, path-independent half of the "strict acyclic
/// specification" behaviour `spec.md` §4.7 asks for: a rule that would make
/// `root` its own descendant can never contribute to a finite derivation of
/// anything reachable from `root`, so it is removed before the fixed point
/// even runs. The remaining, harder half — refusing a rule because one of
/// its children is some *other* ancestor on the particular path being
/// extracted — is necessarily a property of a single extraction attempt,
/// not of the global rule_dict, so it is handled by
/// [`crate::extract::proof_tree_bfs`]'s `iterative` mode instead.
#[must_use]
pub fn iterative_prune(rule_dict: &RewrittenRuleDict, root: Label) -> HashSet<Label> {
    let filtered: RewrittenRuleDict = rule_dict
        .iter()
        .map(|(&parent, rules)| {
            let kept = rules
                .iter()
                .filter(|r| !r.children.contains(&root))
                .cloned()
                .collect::<Vec<_>>();
            (parent, kept)
        })
        .collect();
    prune(&filtered)
}

/// Restrict `rule_dict` to labels in `p`, and each label's candidate rules
/// to those whose children are all in `p`.
#[must_use]
pub fn restrict(rule_dict: &RewrittenRuleDict, p: &HashSet<Label>) -> RewrittenRuleDict {
    rule_dict
        .iter()
        .filter(|(parent, _)| p.contains(parent))
        .map(|(&parent, rules)| {
            let kept = rules
                .iter()
                .filter(|r| r.children.iter().all(|c| p.contains(c)))
                .cloned()
                .collect::<Vec<_>>();
            (parent, kept)
        })
        .collect()
}

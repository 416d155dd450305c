//! Rewriting the rule hypergraph into the label-only form the tree searcher
//! walks.
//!
//! `spec.md` §4.7 describes the tree searcher as operating on a rewritten
//! `rule_dict: label -> [tuple of labels]`, where every parent and child has
//! already been replaced by its equivalence representative, plus an
//! artificial empty-children rule for every verified representative. This
//! module builds that structure from the three core databases.

use std::collections::{HashMap, HashSet};

use css_core::classdb::ClassDb;
use css_core::class::CombinatorialClass;
use css_core::combinator::Combinator;
use css_core::equivdb::EquivDb;
use css_core::label::Label;
use css_core::ruledb::RuleDb;

/// One candidate production for a representative label, already rewritten
/// through the equivalence database.
///
/// `original_parent`/`original_children` keep the concrete (pre-rewrite)
/// labels the rule was actually recorded against, so [`crate::proof_tree`]
/// can recover the equivalence path from a node's representative down to
/// the concrete class the rule decomposed, via [`EquivDb::find_path`].
#[derive(Debug, Clone)]
pub struct RewrittenRule {
    pub original_parent: Label,
    /// Representative labels of the children, in the same order as
    /// `original_children`.
    pub children: Vec<Label>,
    pub original_children: Vec<Label>,
    pub formal_step: String,
    pub combinator: Combinator,
}

/// The rewritten hypergraph the tree searcher walks: representative label
/// to every candidate rule whose (rewritten) parent is that representative.
pub type RewrittenRuleDict = HashMap<Label, Vec<RewrittenRule>>;

/// Build the rewritten rule dictionary described in `spec.md` §4.7.
///
/// For every verified representative without an explicit zero-children rule
/// already in `ruledb`, an artificial empty-children [`RewrittenRule`] is
/// added, using the first directly-strategy-verified label in that
/// equivalence set as the witness for its formal step.
pub fn build_rule_dict<C: CombinatorialClass>(
    ruledb: &RuleDb,
    classdb: &ClassDb<C>,
    equivdb: &mut EquivDb,
) -> RewrittenRuleDict {
    let mut dict: RewrittenRuleDict = HashMap::new();

    for rule in ruledb.iter() {
        let parent_rep = equivdb.representative(rule.parent);
        let children_reps: Vec<Label> = rule
            .children
            .iter()
            .map(|&child| equivdb.representative(child))
            .collect();
        dict.entry(parent_rep).or_default().push(RewrittenRule {
            original_parent: rule.parent,
            children: children_reps,
            original_children: rule.children.clone(),
            formal_step: rule.explanation.clone(),
            combinator: rule.combinator,
        });
    }

    let mut witnessed: HashSet<Label> = dict
        .iter()
        .filter(|(_, rules)| rules.iter().any(|r| r.children.is_empty()))
        .map(|(&rep, _)| rep)
        .collect();

    for label in classdb.labels() {
        if !classdb.strategy_verified(label) {
            continue;
        }
        let rep = equivdb.representative(label);
        if witnessed.contains(&rep) {
            continue;
        }
        witnessed.insert(rep);
        let reason = classdb
            .verification_reason(label)
            .unwrap_or("Verified by strategy.")
            .to_string();
        dict.entry(rep).or_default().push(RewrittenRule {
            original_parent: label,
            children: Vec::new(),
            original_children: Vec::new(),
            formal_step: reason,
            combinator: Combinator::Disjoint,
        });
    }

    dict
}

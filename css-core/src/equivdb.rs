//! Union-find over labels, with an explanation recorded on every union.
//!
//! `spec.md` §9 design note: the partition structure (which may compress
//! paths freely) and the explanation-edge graph (an unchanging record of
//! stated equalities) are kept as two separate structures on purpose, so
//! compressing the union-find never loses the ability to reconstruct a
//! human-readable chain of reasons between two equivalent labels.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::label::Label;

fn edge_key(u: Label, v: Label) -> (Label, Label) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

/// Union-find over [`Label`] with explanations attached to every union.
#[derive(Default)]
pub struct EquivDb {
    parent: HashMap<Label, Label>,
    rank: HashMap<Label, u32>,
    verified: HashMap<Label, bool>,
    /// Undirected adjacency for BFS path reconstruction.
    adjacency: HashMap<Label, Vec<Label>>,
    /// Explanation for a direct union edge, keyed by the unordered pair.
    explanations: HashMap<(Label, Label), String>,
}

impl EquivDb {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, label: Label) {
        self.parent.entry(label).or_insert(label);
        self.rank.entry(label).or_insert(0);
    }

    /// Find the representative of `label`'s set, compressing the path.
    ///
    /// Labels not yet seen by this database are their own representative —
    /// a label that has never been united is trivially equivalent only to
    /// itself.
    #[must_use]
    pub fn representative(&mut self, label: Label) -> Label {
        self.ensure(label);
        let parent = self.parent[&label];
        if parent == label {
            return label;
        }
        let root = self.representative(parent);
        self.parent.insert(label, root);
        root
    }

    /// Whether `u` and `v` are known to be in the same equivalence set.
    pub fn equivalent(&mut self, u: Label, v: Label) -> bool {
        self.representative(u) == self.representative(v)
    }

    /// Unite `u` and `v`, recording `explanation` on the direct edge.
    ///
    /// Idempotent and commutative with respect to the final partition: the
    /// resulting set of `(a, b)` pairs with `equivalent(a, b) == true` does
    /// not depend on call order or on which side is passed as `u` vs `v`.
    pub fn union(&mut self, u: Label, v: Label, explanation: impl Into<String>) {
        self.ensure(u);
        self.ensure(v);

        // The explanation graph is an append-only record of stated
        // equalities, independent of the union-find's internal compression.
        self.adjacency.entry(u).or_default().push(v);
        self.adjacency.entry(v).or_default().push(u);
        self.explanations.insert(edge_key(u, v), explanation.into());

        let ru = self.representative(u);
        let rv = self.representative(v);
        if ru == rv {
            tracing::trace!(%u, %v, "union already in same equivalence set");
            return;
        }

        let merged_verified = self.is_verified(ru) || self.is_verified(rv);
        let rank_u = self.rank[&ru];
        let rank_v = self.rank[&rv];
        let new_root = if rank_u < rank_v {
            self.parent.insert(ru, rv);
            rv
        } else if rank_u > rank_v {
            self.parent.insert(rv, ru);
            ru
        } else {
            self.parent.insert(rv, ru);
            self.rank.insert(ru, rank_u + 1);
            ru
        };
        self.verified.insert(new_root, merged_verified);
        tracing::debug!(%u, %v, root = %new_root, "united labels");
    }

    /// Mark the equivalence set containing `label` as verified.
    pub fn update_verified(&mut self, label: Label) {
        let root = self.representative(label);
        self.verified.insert(root, true);
    }

    /// Whether the equivalence set containing `label` is verified.
    ///
    /// Constant over the whole equivalence class by construction: the flag
    /// lives on the representative, and [`EquivDb::union`] ORs the two
    /// sides' flags into the merged root.
    pub fn is_verified(&mut self, label: Label) -> bool {
        let root = self.representative(label);
        self.verified.get(&root).copied().unwrap_or(false)
    }

    /// The direct explanation for the edge `(u, v)`, if one was ever
    /// recorded by a call to [`EquivDb::union`] with exactly this pair
    /// (in either order).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoDirectExplanation`] if `u` and `v` were never
    /// directly united (they may still be equivalent via a longer chain).
    pub fn get_explanation(&self, u: Label, v: Label) -> Result<&str, CoreError> {
        self.explanations
            .get(&edge_key(u, v))
            .map(String::as_str)
            .ok_or(CoreError::NoDirectExplanation { u, v })
    }

    /// The shortest chain of directly-united labels from `u` to `v`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotEquivalent`] if `u` and `v` are not in the
    /// same equivalence set.
    pub fn find_path(&mut self, u: Label, v: Label) -> Result<Vec<Label>, CoreError> {
        if !self.equivalent(u, v) {
            return Err(CoreError::NotEquivalent { u, v });
        }
        if u == v {
            return Ok(vec![u]);
        }

        let mut queue = VecDeque::new();
        let mut came_from: HashMap<Label, Label> = HashMap::new();
        queue.push_back(u);
        came_from.insert(u, u);

        while let Some(current) = queue.pop_front() {
            if current == v {
                break;
            }
            if let Some(neighbours) = self.adjacency.get(&current) {
                for &next in neighbours {
                    if !came_from.contains_key(&next) {
                        came_from.insert(next, current);
                        queue.push_back(next);
                    }
                }
            }
        }

        if !came_from.contains_key(&v) {
            // equivalent() said yes (same union-find root) but there is no
            // explanation-edge path: this would mean a union happened
            // without recording an edge, which this API never does.
            unreachable!("equivalent labels must be connected in the explanation graph");
        }

        let mut path = vec![v];
        let mut current = v;
        while current != u {
            current = came_from[&current];
            path.push(current);
        }
        path.reverse();
        Ok(path)
    }

    /// The explanations for each step of [`EquivDb::find_path`]'s chain.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::NotEquivalent`] from `find_path`.
    pub fn explain_path(&mut self, u: Label, v: Label) -> Result<Vec<String>, CoreError> {
        let path = self.find_path(u, v)?;
        let mut explanations = Vec::with_capacity(path.len().saturating_sub(1));
        for window in path.windows(2) {
            let explanation = self
                .get_explanation(window[0], window[1])
                .expect("find_path only returns edges with a recorded explanation");
            explanations.push(explanation.to_string());
        }
        Ok(explanations)
    }
}

/// A serializable snapshot of an [`EquivDb`] (`spec.md` §6, reserved key
/// `equivdb`).
#[derive(Debug, Serialize, Deserialize)]
pub struct EquivDbSnapshot {
    parent: Vec<(Label, Label)>,
    rank: Vec<(Label, u32)>,
    verified_roots: Vec<Label>,
    adjacency: Vec<(Label, Label)>,
    explanations: Vec<(Label, Label, String)>,
}

impl EquivDb {
    /// Snapshot the database for serialization.
    #[must_use]
    pub fn to_snapshot(&self) -> EquivDbSnapshot {
        EquivDbSnapshot {
            parent: self.parent.iter().map(|(&k, &v)| (k, v)).collect(),
            rank: self.rank.iter().map(|(&k, &v)| (k, v)).collect(),
            verified_roots: self
                .verified
                .iter()
                .filter(|&(_, &v)| v)
                .map(|(&k, _)| k)
                .collect(),
            adjacency: self
                .adjacency
                .iter()
                .flat_map(|(&k, vs)| vs.iter().map(move |&v| (k, v)))
                .collect(),
            explanations: self
                .explanations
                .iter()
                .map(|(&(u, v), reason)| (u, v, reason.clone()))
                .collect(),
        }
    }

    /// Rebuild a database from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: EquivDbSnapshot) -> Self {
        let mut db = Self::default();
        db.parent = snapshot.parent.into_iter().collect();
        db.rank = snapshot.rank.into_iter().collect();
        for root in snapshot.verified_roots {
            db.verified.insert(root, true);
        }
        for (u, v) in snapshot.adjacency {
            db.adjacency.entry(u).or_default().push(v);
        }
        for (u, v, reason) in snapshot.explanations {
            db.explanations.insert(edge_key(u, v), reason);
        }
        db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(n: u32) -> Label {
        Label::from_raw(n)
    }

    #[test]
    fn union_makes_labels_equivalent() {
        let mut db = EquivDb::new();
        db.union(l(0), l(1), "r1");
        assert!(db.equivalent(l(0), l(1)));
        assert!(!db.equivalent(l(0), l(2)));
    }

    #[test]
    fn union_is_commutative_in_effect() {
        let mut a = EquivDb::new();
        a.union(l(0), l(1), "r1");
        a.union(l(1), l(2), "r2");

        let mut b = EquivDb::new();
        b.union(l(2), l(1), "r2");
        b.union(l(1), l(0), "r1");

        assert_eq!(a.equivalent(l(0), l(2)), b.equivalent(l(0), l(2)));
        assert!(a.equivalent(l(0), l(2)));
    }

    #[test]
    fn find_path_requires_equivalence() {
        let mut db = EquivDb::new();
        db.union(l(0), l(1), "r1");
        assert_eq!(
            db.find_path(l(0), l(5)),
            Err(CoreError::NotEquivalent { u: l(0), v: l(5) })
        );
    }

    #[test]
    fn find_path_is_shortest_chain() {
        // S4: A -r1-> A' -r2-> A''
        let mut db = EquivDb::new();
        db.union(l(0), l(1), "r1");
        db.union(l(1), l(2), "r2");

        let path = db.find_path(l(0), l(2)).unwrap();
        assert_eq!(path, vec![l(0), l(1), l(2)]);

        let explanations = db.explain_path(l(0), l(2)).unwrap();
        assert_eq!(explanations, vec!["r1".to_string(), "r2".to_string()]);
    }

    #[test]
    fn find_path_prefers_shorter_route() {
        let mut db = EquivDb::new();
        // 0-1-2-3 chain plus a direct 0-3 shortcut.
        db.union(l(0), l(1), "a");
        db.union(l(1), l(2), "b");
        db.union(l(2), l(3), "c");
        db.union(l(0), l(3), "shortcut");

        let path = db.find_path(l(0), l(3)).unwrap();
        assert_eq!(path, vec![l(0), l(3)]);
    }

    #[test]
    fn get_explanation_requires_direct_edge() {
        let mut db = EquivDb::new();
        db.union(l(0), l(1), "a");
        db.union(l(1), l(2), "b");
        assert!(db.get_explanation(l(0), l(1)).is_ok());
        assert_eq!(
            db.get_explanation(l(0), l(2)),
            Err(CoreError::NoDirectExplanation { u: l(0), v: l(2) })
        );
    }

    #[test]
    fn verification_propagates_across_union() {
        let mut db = EquivDb::new();
        db.union(l(0), l(1), "a");
        db.update_verified(l(0));
        assert!(db.is_verified(l(1)), "verification must be constant over the set");

        db.union(l(1), l(2), "b");
        assert!(db.is_verified(l(2)), "newly merged member inherits verification");
    }

    #[test]
    fn unseen_label_is_equivalent_only_to_itself() {
        let mut db = EquivDb::new();
        assert!(db.equivalent(l(9), l(9)));
        assert!(!db.is_verified(l(9)));
    }

    #[test]
    fn snapshot_round_trips() {
        let mut db = EquivDb::new();
        db.union(l(0), l(1), "a");
        db.union(l(1), l(2), "b");
        db.update_verified(l(0));

        let snapshot = db.to_snapshot();
        let mut restored = EquivDb::from_snapshot(snapshot);

        assert!(restored.equivalent(l(0), l(2)));
        assert!(restored.is_verified(l(2)));
        assert_eq!(restored.find_path(l(0), l(2)).unwrap(), vec![l(0), l(1), l(2)]);
    }
}

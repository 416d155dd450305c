//! The three-tier scheduling queue the driver pulls labels from.
//!
//! `spec.md` §4.4: working drains first, then current; when both are empty,
//! next is promoted to current (advancing the level counter) and next
//! starts over empty. The ignore set screens every dequeue regardless of
//! tier.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use css_core::label::Label;

/// A level-order work queue over labels.
#[derive(Debug, Default)]
pub struct WorkQueue {
    working: VecDeque<Label>,
    current: VecDeque<Label>,
    next: VecDeque<Label>,
    ignore: HashSet<Label>,
    level: u32,
}

impl WorkQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a label to be drained before the current level continues.
    ///
    /// Used for an equivalence merge or a non-initial-expansion child
    /// (`spec.md` §4.4).
    pub fn add_working(&mut self, label: Label) {
        self.working.push_back(label);
    }

    /// Enqueue a label for the level after the one currently draining.
    ///
    /// Used for a freshly seen label and for children of an
    /// initial-expansion rule.
    pub fn add_next(&mut self, label: Label) {
        self.next.push_back(label);
    }

    /// Screen `label` out of all future dequeues.
    ///
    /// Used when a label is retired by `expanding_children_only` or has
    /// finished initial expansion.
    pub fn ignore(&mut self, label: Label) {
        self.ignore.insert(label);
    }

    #[must_use]
    pub fn is_ignored(&self, label: Label) -> bool {
        self.ignore.contains(&label)
    }

    /// Pull the next label to process, or `None` if the queue is fully
    /// drained (working, current, and next all empty once ignored labels
    /// are screened out).
    pub fn pop(&mut self) -> Option<Label> {
        loop {
            if let Some(label) = self.working.pop_front() {
                if self.ignore.contains(&label) {
                    continue;
                }
                return Some(label);
            }
            if let Some(label) = self.current.pop_front() {
                if self.ignore.contains(&label) {
                    continue;
                }
                return Some(label);
            }
            if self.next.is_empty() {
                return None;
            }
            std::mem::swap(&mut self.current, &mut self.next);
            self.next.clear();
            self.level += 1;
            tracing::debug!(level = self.level, "advanced to next level");
        }
    }

    /// The current level counter, incremented each time `next` is promoted
    /// to `current`.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// `true` once every tier is either empty or fully ignored.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.working.iter().all(|l| self.ignore.contains(l))
            && self.current.iter().all(|l| self.ignore.contains(l))
            && self.next.iter().all(|l| self.ignore.contains(l))
    }
}

/// A serializable snapshot of a [`WorkQueue`] (`spec.md` §6, reserved key
/// `classqueue`).
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkQueueSnapshot {
    working: Vec<Label>,
    current: Vec<Label>,
    next: Vec<Label>,
    ignore: Vec<Label>,
    level: u32,
}

impl WorkQueue {
    #[must_use]
    pub fn to_snapshot(&self) -> WorkQueueSnapshot {
        WorkQueueSnapshot {
            working: self.working.iter().copied().collect(),
            current: self.current.iter().copied().collect(),
            next: self.next.iter().copied().collect(),
            ignore: self.ignore.iter().copied().collect(),
            level: self.level,
        }
    }

    #[must_use]
    pub fn from_snapshot(snapshot: WorkQueueSnapshot) -> Self {
        Self {
            working: snapshot.working.into_iter().collect(),
            current: snapshot.current.into_iter().collect(),
            next: snapshot.next.into_iter().collect(),
            ignore: snapshot.ignore.into_iter().collect(),
            level: snapshot.level,
        }
    }
}

//! Change detection for child collections
//!
//! Compares each entry's current fields against the snapshot taken at
//! load time. Only user-entered fields participate; identity and audit
//! columns are not part of the field structs, so a row whose
//! `updated_at` moved on the server still counts as unchanged.
//! Planning is pure: the same aggregate state always yields the same
//! plan.

use crate::aggregate::ChildEntry;
use shared::models::ChildKey;
use std::collections::HashMap;
use uuid::Uuid;

/// What the persistence sequence should do with one child collection
#[derive(Debug, Clone, PartialEq)]
pub struct ChildPlan<F> {
    /// Rows that exist only in the editor, keyed by their temp token
    pub creates: Vec<(Uuid, F)>,
    /// Persisted rows whose fields differ from their snapshot
    pub updates: Vec<(i64, F)>,
    /// Persisted rows left untouched
    pub skipped: Vec<i64>,
}

impl<F> Default for ChildPlan<F> {
    fn default() -> Self {
        Self {
            creates: Vec::new(),
            updates: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<F> ChildPlan<F> {
    /// True when no writes are needed
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }
}

/// Classify entries against their load-time snapshots.
///
/// A persisted entry without a snapshot cannot be proven unchanged and
/// is written; collections that keep no snapshots get rewritten in full
/// this way.
pub fn plan<F: Clone + PartialEq>(
    entries: &[ChildEntry<F>],
    originals: &HashMap<i64, F>,
) -> ChildPlan<F> {
    let mut plan = ChildPlan::default();

    for entry in entries {
        match entry.key {
            ChildKey::Temp(token) => plan.creates.push((token, entry.fields.clone())),
            ChildKey::Persisted(id) => match originals.get(&id) {
                Some(original) if *original == entry.fields => plan.skipped.push(id),
                _ => plan.updates.push((id, entry.fields.clone())),
            },
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: ChildKey, value: i32) -> ChildEntry<i32> {
        ChildEntry { key, fields: value }
    }

    #[test]
    fn test_plan_classifies_creates_updates_and_skips() {
        let token = Uuid::new_v4();
        let entries = vec![
            entry(ChildKey::Temp(token), 10),
            entry(ChildKey::Persisted(1), 20),
            entry(ChildKey::Persisted(2), 99),
        ];
        let originals = HashMap::from([(1, 20), (2, 30)]);

        let plan = plan(&entries, &originals);
        assert_eq!(plan.creates, vec![(token, 10)]);
        assert_eq!(plan.updates, vec![(2, 99)]);
        assert_eq!(plan.skipped, vec![1]);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let entries = vec![
            entry(ChildKey::Persisted(1), 20),
            entry(ChildKey::Temp(Uuid::new_v4()), 5),
        ];
        let originals = HashMap::from([(1, 20)]);

        assert_eq!(plan(&entries, &originals), plan(&entries, &originals));
    }

    #[test]
    fn test_persisted_row_without_snapshot_is_written() {
        let entries = vec![entry(ChildKey::Persisted(7), 42)];

        let plan = plan(&entries, &HashMap::new());
        assert_eq!(plan.updates, vec![(7, 42)]);
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_empty_entries_need_no_writes() {
        let plan = plan::<i32>(&[], &HashMap::new());
        assert!(plan.is_empty());
    }
}

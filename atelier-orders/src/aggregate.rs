//! Editable order aggregate
//!
//! The caller owns one of these per editing session. It holds the
//! header draft and the four child collections, plus the bookkeeping
//! change detection needs: per-row snapshots taken at load time and the
//! ids of persisted rows removed in the editor.
//!
//! Detail lines and payments keep snapshots so unchanged rows are
//! skipped on save. Workshop assignments and resource requirements do
//! not; every row present at save time is rewritten.

use crate::diff::{self, ChildPlan};
use atelier_client::OrderApi;
use shared::ProviderResult;
use shared::models::{
    ChildKey, DetailFields, OrderDraft, PaymentFields, RequirementFields, WorkshopFields,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Server identity of the aggregate root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderIdentity {
    /// Not yet persisted; saving creates the header
    New,
    /// Persisted under `id`; `version` is the compare-and-swap token
    Persisted { id: i64, version: i64 },
}

/// One child row in the editor
#[derive(Debug, Clone, PartialEq)]
pub struct ChildEntry<F> {
    pub key: ChildKey,
    pub fields: F,
}

/// A child collection plus its change-detection bookkeeping
#[derive(Debug, Clone)]
pub struct ChildSet<F> {
    entries: Vec<ChildEntry<F>>,
    /// Fields of each persisted row as loaded, keyed by server id
    originals: HashMap<i64, F>,
    /// Persisted rows removed in the editor, deleted on save
    removed: Vec<i64>,
    keep_originals: bool,
}

impl<F: Clone + PartialEq> ChildSet<F> {
    /// Empty collection that snapshots rows as they persist
    pub fn tracked() -> Self {
        Self {
            entries: Vec::new(),
            originals: HashMap::new(),
            removed: Vec::new(),
            keep_originals: true,
        }
    }

    /// Empty collection that keeps no snapshots; rows present at save
    /// time are always rewritten
    pub fn untracked() -> Self {
        Self {
            keep_originals: false,
            ..Self::tracked()
        }
    }

    /// Loaded rows with snapshots for skip-unchanged detection
    pub fn tracked_from(rows: Vec<(i64, F)>) -> Self {
        let mut set = Self::tracked();
        for (id, fields) in rows {
            set.originals.insert(id, fields.clone());
            set.entries.push(ChildEntry {
                key: ChildKey::Persisted(id),
                fields,
            });
        }
        set
    }

    /// Loaded rows without snapshots
    pub fn untracked_from(rows: Vec<(i64, F)>) -> Self {
        let mut set = Self::untracked();
        for (id, fields) in rows {
            set.entries.push(ChildEntry {
                key: ChildKey::Persisted(id),
                fields,
            });
        }
        set
    }

    /// Add a row that only exists in the editor
    pub fn push(&mut self, fields: F) -> ChildKey {
        let key = ChildKey::fresh();
        self.entries.push(ChildEntry { key, fields });
        key
    }

    /// Remove a row. Persisted rows are remembered for deletion on the
    /// next save; temp rows just disappear.
    pub fn remove(&mut self, key: ChildKey) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.key == key) else {
            return false;
        };
        let entry = self.entries.remove(pos);
        if let Some(id) = entry.key.persisted_id() {
            self.removed.push(id);
        }
        true
    }

    pub fn get_mut(&mut self, key: ChildKey) -> Option<&mut F> {
        self.entries
            .iter_mut()
            .find(|e| e.key == key)
            .map(|e| &mut e.fields)
    }

    pub fn entries(&self) -> &[ChildEntry<F>] {
        &self.entries
    }

    pub fn removed_ids(&self) -> &[i64] {
        &self.removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of a persisted row as loaded, if one is kept
    pub fn original(&self, id: i64) -> Option<&F> {
        self.originals.get(&id)
    }

    /// Classify entries for the next save
    pub fn plan(&self) -> ChildPlan<F> {
        diff::plan(&self.entries, &self.originals)
    }

    // ==================== Post-save bookkeeping ====================

    /// A temp row landed on the server: adopt its id and snapshot it
    pub fn absorb_created(&mut self, token: Uuid, id: i64) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.key == ChildKey::Temp(token))
        {
            entry.key = ChildKey::Persisted(id);
            if self.keep_originals {
                self.originals.insert(id, entry.fields.clone());
            }
        }
    }

    /// A persisted row was rewritten: its current fields are the new snapshot
    pub fn absorb_updated(&mut self, id: i64) {
        if !self.keep_originals {
            return;
        }
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.key == ChildKey::Persisted(id))
        {
            self.originals.insert(id, entry.fields.clone());
        }
    }

    /// The pending deletes went through
    pub fn absorb_deleted(&mut self) {
        for id in self.removed.drain(..) {
            self.originals.remove(&id);
        }
    }
}

/// Everything one order save operates on
#[derive(Debug, Clone)]
pub struct OrderAggregate {
    identity: OrderIdentity,
    pub draft: OrderDraft,
    pub details: ChildSet<DetailFields>,
    pub payments: ChildSet<PaymentFields>,
    pub workshops: ChildSet<WorkshopFields>,
    pub requirements: ChildSet<RequirementFields>,
}

impl OrderAggregate {
    /// Fresh aggregate for an order that does not exist yet
    pub fn new(draft: OrderDraft) -> Self {
        Self {
            identity: OrderIdentity::New,
            draft,
            details: ChildSet::tracked(),
            payments: ChildSet::tracked(),
            workshops: ChildSet::untracked(),
            requirements: ChildSet::untracked(),
        }
    }

    /// Load an existing order and its children for editing
    pub async fn load(api: &OrderApi, order_id: i64) -> ProviderResult<Self> {
        let (header, details, payments, workshops, requirements) = futures::try_join!(
            api.get_order(order_id),
            api.list_details(order_id),
            api.list_payments(order_id),
            api.list_workshops(order_id),
            api.list_requirements(order_id),
        )?;

        Ok(Self {
            identity: OrderIdentity::Persisted {
                id: header.id,
                version: header.version,
            },
            draft: OrderDraft::from(&header),
            details: ChildSet::tracked_from(
                details.into_iter().map(|r| (r.id, r.fields)).collect(),
            ),
            payments: ChildSet::tracked_from(
                payments.into_iter().map(|r| (r.id, r.fields)).collect(),
            ),
            workshops: ChildSet::untracked_from(
                workshops.into_iter().map(|r| (r.id, r.fields)).collect(),
            ),
            requirements: ChildSet::untracked_from(
                requirements.into_iter().map(|r| (r.id, r.fields)).collect(),
            ),
        })
    }

    pub fn identity(&self) -> OrderIdentity {
        self.identity
    }

    pub fn order_id(&self) -> Option<i64> {
        match self.identity {
            OrderIdentity::Persisted { id, .. } => Some(id),
            OrderIdentity::New => None,
        }
    }

    /// Version the next header write must present
    pub fn version(&self) -> Option<i64> {
        match self.identity {
            OrderIdentity::Persisted { version, .. } => Some(version),
            OrderIdentity::New => None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.identity == OrderIdentity::New
    }

    /// Adopt the identity returned by a header write
    pub fn set_persisted(&mut self, id: i64, version: i64) {
        self.identity = OrderIdentity::Persisted { id, version };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_set_skips_unchanged_rows() {
        let set = ChildSet::tracked_from(vec![(1, 10), (2, 20)]);

        let plan = set.plan();
        assert!(plan.is_empty());
        assert_eq!(plan.skipped, vec![1, 2]);
    }

    #[test]
    fn test_untracked_set_rewrites_everything() {
        let set = ChildSet::untracked_from(vec![(1, 10), (2, 20)]);

        let plan = set.plan();
        assert_eq!(plan.updates, vec![(1, 10), (2, 20)]);
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_editing_a_row_marks_it_for_update() {
        let mut set = ChildSet::tracked_from(vec![(1, 10), (2, 20)]);
        *set.get_mut(ChildKey::Persisted(2)).unwrap() = 99;

        let plan = set.plan();
        assert_eq!(plan.updates, vec![(2, 99)]);
        assert_eq!(plan.skipped, vec![1]);
    }

    #[test]
    fn test_removing_persisted_row_queues_delete() {
        let mut set = ChildSet::tracked_from(vec![(1, 10)]);
        assert!(set.remove(ChildKey::Persisted(1)));

        assert!(set.is_empty());
        assert_eq!(set.removed_ids(), &[1]);

        set.absorb_deleted();
        assert!(set.removed_ids().is_empty());
        assert!(set.original(1).is_none());
    }

    #[test]
    fn test_removing_temp_row_leaves_no_trace() {
        let mut set = ChildSet::tracked();
        let key = set.push(10);
        assert!(set.remove(key));

        assert!(set.is_empty());
        assert!(set.removed_ids().is_empty());
    }

    #[test]
    fn test_absorb_created_rekeys_and_snapshots() {
        let mut set = ChildSet::tracked();
        let key = set.push(10);
        let ChildKey::Temp(token) = key else {
            panic!("push must hand out a temp key");
        };

        set.absorb_created(token, 55);

        assert_eq!(set.entries()[0].key, ChildKey::Persisted(55));
        assert_eq!(set.original(55), Some(&10));
        assert!(set.plan().is_empty(), "freshly absorbed row needs no write");
    }

    #[test]
    fn test_absorb_created_in_untracked_set_keeps_no_snapshot() {
        let mut set = ChildSet::untracked();
        let ChildKey::Temp(token) = set.push(10) else {
            panic!("push must hand out a temp key");
        };

        set.absorb_created(token, 55);

        assert_eq!(set.entries()[0].key, ChildKey::Persisted(55));
        assert!(set.original(55).is_none());
        assert_eq!(set.plan().updates, vec![(55, 10)]);
    }

    #[test]
    fn test_new_aggregate_is_unpersisted() {
        let draft = OrderDraft {
            client_id: 11,
            manager_id: None,
            status_id: 1,
            payment_status_id: 1,
            ordered_on: None,
            due_on: None,
            fitted_on: None,
            drawing_file: None,
            measure_sheet: None,
        };
        let mut aggregate = OrderAggregate::new(draft);

        assert!(aggregate.is_new());
        assert_eq!(aggregate.order_id(), None);
        assert_eq!(aggregate.version(), None);

        aggregate.set_persisted(42, 1);
        assert_eq!(aggregate.order_id(), Some(42));
        assert_eq!(aggregate.version(), Some(1));
        assert!(!aggregate.is_new());
    }
}

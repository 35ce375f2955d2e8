use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use mealbridge::lifecycle::{
    ActingIdentity, ClaimError, ClaimStore, ItemId, ItemKind, ItemRecord, ItemStatus, ItemStore,
    StoreError, TransitionFields,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct ItemTables {
    donations: HashMap<ItemId, ItemRecord>,
    requests: HashMap<ItemId, ItemRecord>,
}

impl ItemTables {
    fn table(&self, kind: ItemKind) -> &HashMap<ItemId, ItemRecord> {
        match kind {
            ItemKind::Donation => &self.donations,
            ItemKind::Request => &self.requests,
        }
    }

    fn table_mut(&mut self, kind: ItemKind) -> &mut HashMap<ItemId, ItemRecord> {
        match kind {
            ItemKind::Donation => &mut self.donations,
            ItemKind::Request => &mut self.requests,
        }
    }
}

/// In-memory item store keeping the two tagged collections behind one mutex,
/// so the status and payload writes of `advance` share a single atomic
/// critical section.
#[derive(Default, Clone)]
pub(crate) struct InMemoryItemStore {
    tables: Arc<Mutex<ItemTables>>,
}

impl ItemStore for InMemoryItemStore {
    fn insert(&self, record: ItemRecord) -> Result<ItemRecord, StoreError> {
        let mut guard = self.tables.lock().expect("item store mutex poisoned");
        let table = guard.table_mut(record.kind);
        if table.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        table.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn find(&self, kind: ItemKind, id: &ItemId) -> Result<Option<ItemRecord>, StoreError> {
        let guard = self.tables.lock().expect("item store mutex poisoned");
        Ok(guard.table(kind).get(id).cloned())
    }

    fn advance(
        &self,
        kind: ItemKind,
        id: &ItemId,
        claimed: ItemStatus,
        target: ItemStatus,
        fields: TransitionFields,
    ) -> Result<ItemRecord, StoreError> {
        let mut guard = self.tables.lock().expect("item store mutex poisoned");
        let record = guard
            .table_mut(kind)
            .get_mut(id)
            .ok_or(StoreError::NotFound)?;
        if record.status != claimed {
            return Err(StoreError::Conflict);
        }
        record.status = target;
        if let Some(email) = fields.counterpart_email {
            record.counterpart_email = Some(email);
        }
        if let Some(location) = fields.delivery_location {
            record.delivery_location = Some(location);
        }
        if let Some(need_by) = fields.need_by {
            record.need_by = Some(need_by);
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn remove_new(&self, kind: ItemKind, id: &ItemId) -> Result<(), StoreError> {
        let mut guard = self.tables.lock().expect("item store mutex poisoned");
        let table = guard.table_mut(kind);
        match table.get(id) {
            None => Err(StoreError::NotFound),
            Some(record) if record.status != ItemStatus::New => Err(StoreError::Conflict),
            Some(_) => {
                table.remove(id);
                Ok(())
            }
        }
    }
}

/// In-memory claim ledger keyed by acting admin.
#[derive(Default, Clone)]
pub(crate) struct InMemoryClaimStore {
    claims: Arc<Mutex<HashMap<ActingIdentity, BTreeSet<ItemId>>>>,
}

impl ClaimStore for InMemoryClaimStore {
    fn add(&self, admin: &ActingIdentity, id: &ItemId) -> Result<bool, ClaimError> {
        let mut guard = self.claims.lock().expect("claim store mutex poisoned");
        Ok(guard.entry(admin.clone()).or_default().insert(id.clone()))
    }

    fn claims_for(&self, admin: &ActingIdentity) -> Result<BTreeSet<ItemId>, ClaimError> {
        let guard = self.claims.lock().expect("claim store mutex poisoned");
        Ok(guard.get(admin).cloned().unwrap_or_default())
    }
}

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDateTime, Utc};
use serde_json::Value;

use crate::lifecycle::domain::{
    parse_need_by, ActingIdentity, ItemId, ItemKind, ItemRecord, ItemStatus, TransitionIntent,
    TransitionRequest,
};
use crate::lifecycle::repository::{
    ClaimError, ClaimStore, ItemStore, StoreError, TransitionFields,
};
use crate::lifecycle::router::lifecycle_router;
use crate::lifecycle::service::LifecycleService;

pub(super) fn admin() -> ActingIdentity {
    ActingIdentity("dispatch@mealbridge.org".to_string())
}

pub(super) fn sample_need_by() -> NaiveDateTime {
    parse_need_by("2025-01-01T10:00").expect("sample need-by parses")
}

pub(super) fn record_at(kind: ItemKind, id: &str, status: ItemStatus) -> ItemRecord {
    let mut record = ItemRecord::new(ItemId(id.to_string()), kind, None);
    record.status = status;
    record
}

pub(super) fn donation_at(id: &str, status: ItemStatus) -> ItemRecord {
    record_at(ItemKind::Donation, id, status)
}

pub(super) fn request_at(id: &str, status: ItemStatus) -> ItemRecord {
    record_at(ItemKind::Request, id, status)
}

pub(super) fn plain_transition(claimed: ItemStatus) -> TransitionRequest {
    TransitionRequest {
        current_status: claimed,
        ..TransitionRequest::default()
    }
}

pub(super) fn donate_confirm(need_by: Option<NaiveDateTime>) -> TransitionRequest {
    TransitionRequest {
        current_status: ItemStatus::New,
        intent: TransitionIntent::DonateConfirm,
        delivery_location: None,
        need_by,
    }
}

pub(super) fn accept_confirm(
    delivery_location: Option<&str>,
    need_by: Option<NaiveDateTime>,
) -> TransitionRequest {
    TransitionRequest {
        current_status: ItemStatus::New,
        intent: TransitionIntent::AcceptConfirm,
        delivery_location: delivery_location.map(str::to_string),
        need_by,
    }
}

pub(super) fn build_service() -> (
    LifecycleService<MemoryItemStore, MemoryClaimStore>,
    Arc<MemoryItemStore>,
    Arc<MemoryClaimStore>,
) {
    let items = Arc::new(MemoryItemStore::default());
    let claims = Arc::new(MemoryClaimStore::default());
    let service = LifecycleService::new(items.clone(), claims.clone());
    (service, items, claims)
}

pub(super) fn lifecycle_router_with_service(
    service: LifecycleService<MemoryItemStore, MemoryClaimStore>,
) -> axum::Router {
    lifecycle_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default)]
struct Tables {
    donations: HashMap<ItemId, ItemRecord>,
    requests: HashMap<ItemId, ItemRecord>,
}

impl Tables {
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

#[derive(Default, Clone)]
pub(super) struct MemoryItemStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryItemStore {
    pub(super) fn seed(&self, record: ItemRecord) {
        let mut guard = self.tables.lock().expect("item store mutex poisoned");
        guard.table_mut(record.kind).insert(record.id.clone(), record);
    }
}

impl ItemStore for MemoryItemStore {
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
        let record = guard.table_mut(kind).get_mut(id).ok_or(StoreError::NotFound)?;
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

#[derive(Default, Clone)]
pub(super) struct MemoryClaimStore {
    claims: Arc<Mutex<HashMap<ActingIdentity, BTreeSet<ItemId>>>>,
}

impl ClaimStore for MemoryClaimStore {
    fn add(&self, admin: &ActingIdentity, id: &ItemId) -> Result<bool, ClaimError> {
        let mut guard = self.claims.lock().expect("claim store mutex poisoned");
        Ok(guard.entry(admin.clone()).or_default().insert(id.clone()))
    }

    fn claims_for(&self, admin: &ActingIdentity) -> Result<BTreeSet<ItemId>, ClaimError> {
        let guard = self.claims.lock().expect("claim store mutex poisoned");
        Ok(guard.get(admin).cloned().unwrap_or_default())
    }
}

pub(super) struct FailingClaimStore;

impl ClaimStore for FailingClaimStore {
    fn add(&self, _admin: &ActingIdentity, _id: &ItemId) -> Result<bool, ClaimError> {
        Err(ClaimError::Unavailable("claim ledger offline".to_string()))
    }

    fn claims_for(&self, _admin: &ActingIdentity) -> Result<BTreeSet<ItemId>, ClaimError> {
        Err(ClaimError::Unavailable("claim ledger offline".to_string()))
    }
}

pub(super) struct UnavailableItemStore;

impl ItemStore for UnavailableItemStore {
    fn insert(&self, _record: ItemRecord) -> Result<ItemRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find(&self, _kind: ItemKind, _id: &ItemId) -> Result<Option<ItemRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn advance(
        &self,
        _kind: ItemKind,
        _id: &ItemId,
        _claimed: ItemStatus,
        _target: ItemStatus,
        _fields: TransitionFields,
    ) -> Result<ItemRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn remove_new(&self, _kind: ItemKind, _id: &ItemId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

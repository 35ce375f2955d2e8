use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use super::domain::{ActingIdentity, ItemId, ItemKind, ItemRecord, ItemStatus};

/// Payload fields written together with the status in one conditional update.
/// Keeping them in the same store call is the transaction boundary the source
/// system lacked; the claim-set write deliberately stays outside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionFields {
    pub counterpart_email: Option<String>,
    pub delivery_location: Option<String>,
    pub need_by: Option<NaiveDateTime>,
}

/// Storage abstraction over the two tagged item collections so the engine can
/// be exercised in isolation.
pub trait ItemStore: Send + Sync {
    fn insert(&self, record: ItemRecord) -> Result<ItemRecord, StoreError>;

    /// Read one record out of a single tagged collection.
    fn find(&self, kind: ItemKind, id: &ItemId) -> Result<Option<ItemRecord>, StoreError>;

    /// Atomic conditional update: match `(kind, id, status == claimed)`, set
    /// `status = target` plus the payload fields, and bump `updated_at`. A
    /// record that exists but no longer holds the claimed status matches zero
    /// rows and must surface as [`StoreError::Conflict`], never be overwritten.
    fn advance(
        &self,
        kind: ItemKind,
        id: &ItemId,
        claimed: ItemStatus,
        target: ItemStatus,
        fields: TransitionFields,
    ) -> Result<ItemRecord, StoreError>;

    /// Conditional remove, legal only while the record still sits in `new`.
    fn remove_new(&self, kind: ItemKind, id: &ItemId) -> Result<(), StoreError>;
}

/// Error enumeration for item-store failures. `Conflict` and `NotFound` are
/// kept distinct so callers can tell a stale claim from a missing record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record did not match the expected state")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Per-admin claim bookkeeping, recorded when an admin takes delivery
/// responsibility for an item. Set semantics: re-adding is a no-op.
pub trait ClaimStore: Send + Sync {
    /// Returns `true` when the id was newly added, `false` when it was
    /// already present for this admin.
    fn add(&self, admin: &ActingIdentity, id: &ItemId) -> Result<bool, ClaimError>;

    fn claims_for(&self, admin: &ActingIdentity) -> Result<BTreeSet<ItemId>, ClaimError>;
}

/// Claim-store failure. Advisory by policy: a failed claim write is logged
/// and never rolls back the committed status transition.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("claim store unavailable: {0}")]
    Unavailable(String),
}

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::warn;

use super::domain::{
    ActingIdentity, ItemId, ItemKind, ItemRecord, ItemStatus, TransitionIntent, TransitionOutcome,
    TransitionRequest,
};
use super::repository::{ClaimError, ClaimStore, ItemStore, StoreError, TransitionFields};

/// Engine composing collection routing, transition validation, the conditional
/// executor, and the claim side effect.
pub struct LifecycleService<S, C> {
    items: Arc<S>,
    claims: Arc<C>,
}

static ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_item_id() -> ItemId {
    let id = ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ItemId(format!("item-{id:06}"))
}

impl<S, C> LifecycleService<S, C>
where
    S: ItemStore + 'static,
    C: ClaimStore + 'static,
{
    pub fn new(items: Arc<S>, claims: Arc<C>) -> Self {
        Self { items, claims }
    }

    /// Intake surface for UI collaborators: every item starts in `new`.
    pub fn create(
        &self,
        kind: ItemKind,
        counterpart_email: Option<String>,
    ) -> Result<ItemRecord, LifecycleError> {
        let record = ItemRecord::new(next_item_id(), kind, counterpart_email);
        Ok(self.items.insert(record)?)
    }

    /// Resolve which collection an identifier belongs to. Callers never pass
    /// the kind, so the request collection is probed first, then donations;
    /// that priority is load-bearing for ids present in both. Read-only.
    pub fn resolve(&self, id: &ItemId) -> Result<ItemRecord, LifecycleError> {
        if !id.is_well_formed() {
            return Err(LifecycleError::InvalidIdentifier(id.0.clone()));
        }
        if let Some(record) = self.items.find(ItemKind::Request, id)? {
            return Ok(record);
        }
        if let Some(record) = self.items.find(ItemKind::Donation, id)? {
            return Ok(record);
        }
        Err(LifecycleError::Store(StoreError::NotFound))
    }

    /// Read-after-transition surface used by the UI to redisplay state.
    pub fn get(&self, id: &ItemId) -> Result<ItemRecord, LifecycleError> {
        self.resolve(id)
    }

    /// Apply one forward transition.
    ///
    /// The successor is computed purely from the caller-claimed status; the
    /// stored status is never re-read first. A stale claim therefore matches
    /// zero rows in the conditional update and surfaces as `Conflict`. The
    /// claim-set write happens after the item write and is best-effort: its
    /// failure is logged and the committed transition stands.
    pub fn transition(
        &self,
        actor: &ActingIdentity,
        id: &ItemId,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, LifecycleError> {
        if !id.is_well_formed() {
            return Err(LifecycleError::InvalidIdentifier(id.0.clone()));
        }

        let claimed = request.current_status;
        let target = claimed
            .successor()
            .ok_or(LifecycleError::TerminalState(claimed))?;
        let fields = fields_for_intent(actor, request)?;

        let kind = self.resolve(id)?.kind;
        let record = self.items.advance(kind, id, claimed, target, fields)?;

        if claimed == ItemStatus::InWarehouse && target == ItemStatus::AwaitingDelivery {
            if let Err(err) = self.claims.add(actor, id) {
                warn!(
                    item = %id,
                    admin = %actor,
                    error = %err,
                    "claim bookkeeping failed after committed status transition"
                );
            }
        }

        Ok(TransitionOutcome {
            item_id: record.id,
            kind: record.kind,
            status: record.status,
        })
    }

    /// Deletion is not a transition; it is only legal while the item still
    /// sits in `new`, before any claim can exist for it.
    pub fn delete(&self, id: &ItemId) -> Result<(), LifecycleError> {
        let record = self.resolve(id)?;
        self.items.remove_new(record.kind, id)?;
        Ok(())
    }

    pub fn claims_for(&self, admin: &ActingIdentity) -> Result<BTreeSet<ItemId>, LifecycleError> {
        Ok(self.claims.claims_for(admin)?)
    }
}

/// Decide which payload fields the intent writes. Matching intents also
/// disclose the acting identity as the record's counterpart contact.
fn fields_for_intent(
    actor: &ActingIdentity,
    request: &TransitionRequest,
) -> Result<TransitionFields, LifecycleError> {
    match request.intent {
        TransitionIntent::None => Ok(TransitionFields::default()),
        TransitionIntent::DonateConfirm => {
            let need_by = request.need_by.ok_or(LifecycleError::MissingPayload {
                intent: TransitionIntent::DonateConfirm,
                field: "need_by",
            })?;
            Ok(TransitionFields {
                counterpart_email: Some(actor.0.clone()),
                delivery_location: None,
                need_by: Some(need_by),
            })
        }
        TransitionIntent::AcceptConfirm => {
            let delivery_location =
                request
                    .delivery_location
                    .clone()
                    .ok_or(LifecycleError::MissingPayload {
                        intent: TransitionIntent::AcceptConfirm,
                        field: "delivery_location",
                    })?;
            let need_by = request.need_by.ok_or(LifecycleError::MissingPayload {
                intent: TransitionIntent::AcceptConfirm,
                field: "need_by",
            })?;
            Ok(TransitionFields {
                counterpart_email: Some(actor.0.clone()),
                delivery_location: Some(delivery_location),
                need_by: Some(need_by),
            })
        }
    }
}

/// Error raised by the lifecycle engine.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("malformed item identifier '{0}'")]
    InvalidIdentifier(String),
    #[error("no transition defined out of terminal state '{}'", .0.label())]
    TerminalState(ItemStatus),
    #[error("intent '{}' requires the '{field}' payload field", .intent.label())]
    MissingPayload {
        intent: TransitionIntent,
        field: &'static str,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Claims(#[from] ClaimError),
}

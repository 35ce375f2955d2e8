//! Donation/request lifecycle engine.
//!
//! A food item, either a surplus donation or a beneficiary request, advances
//! through a fixed forward-only chain:
//!
//! ```text
//! new -> matched -> inwarehouse -> awaitingdelivery -> delivered
//! ```
//!
//! The engine validates a caller-claimed current status, applies the single
//! legal successor through an atomic conditional store update, and triggers
//! the linked side effects: contact disclosure on matching intents and admin
//! claim bookkeeping when an item enters `awaitingdelivery`. Concurrent
//! callers racing the same item are serialized solely by that conditional
//! update; the loser observes a `Conflict` rather than a silent overwrite.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    parse_need_by, ActingIdentity, CreateItemRequest, ItemId, ItemKind, ItemRecord, ItemStatus,
    TransitionIntent, TransitionOutcome, TransitionRequest,
};
pub use repository::{ClaimError, ClaimStore, ItemStore, StoreError, TransitionFields};
pub use router::{lifecycle_router, ACTING_IDENTITY_HEADER};
pub use service::{LifecycleError, LifecycleService};

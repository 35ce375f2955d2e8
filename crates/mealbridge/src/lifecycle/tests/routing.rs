use super::common::*;
use crate::lifecycle::domain::{ItemId, ItemKind, ItemStatus};
use crate::lifecycle::repository::StoreError;
use crate::lifecycle::service::LifecycleError;

#[test]
fn request_collection_is_probed_first() {
    let (service, items, _) = build_service();
    // Same opaque key living in both collections: the request must win.
    items.seed(donation_at("item-000301", ItemStatus::New));
    items.seed(request_at("item-000301", ItemStatus::Matched));

    let record = service
        .resolve(&ItemId("item-000301".to_string()))
        .expect("resolves");
    assert_eq!(record.kind, ItemKind::Request);
    assert_eq!(record.status, ItemStatus::Matched);
}

#[test]
fn donations_resolve_when_absent_from_requests() {
    let (service, items, _) = build_service();
    items.seed(donation_at("item-000302", ItemStatus::InWarehouse));

    let record = service
        .resolve(&ItemId("item-000302".to_string()))
        .expect("resolves");
    assert_eq!(record.kind, ItemKind::Donation);
}

#[test]
fn unknown_identifier_fails_with_not_found() {
    let (service, _, _) = build_service();

    match service.resolve(&ItemId("item-000303".to_string())) {
        Err(LifecycleError::Store(StoreError::NotFound)) => {}
        other => panic!("expected not-found, got {other:?}"),
    }
}

#[test]
fn malformed_identifier_never_reaches_the_probe() {
    let (service, _, _) = build_service();

    match service.resolve(&ItemId("../../etc".to_string())) {
        Err(LifecycleError::InvalidIdentifier(_)) => {}
        other => panic!("expected invalid-identifier, got {other:?}"),
    }
}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{ActingIdentity, CreateItemRequest, ItemId, TransitionRequest};
use super::repository::{ClaimStore, ItemStore, StoreError};
use super::service::{LifecycleError, LifecycleService};

/// Header carrying the session-derived acting identity. Opaque to the engine.
pub const ACTING_IDENTITY_HEADER: &str = "x-acting-identity";

/// Router builder exposing the lifecycle endpoints.
pub fn lifecycle_router<S, C>(service: Arc<LifecycleService<S, C>>) -> Router
where
    S: ItemStore + 'static,
    C: ClaimStore + 'static,
{
    Router::new()
        .route("/api/v1/items", post(create_handler::<S, C>))
        .route(
            "/api/v1/items/:item_id",
            get(get_handler::<S, C>).delete(delete_handler::<S, C>),
        )
        .route(
            "/api/v1/items/:item_id/transition",
            post(transition_handler::<S, C>),
        )
        .route("/api/v1/admins/:email/claims", get(claims_handler::<S, C>))
        .with_state(service)
}

fn acting_identity(headers: &HeaderMap) -> Option<ActingIdentity> {
    headers
        .get(ACTING_IDENTITY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| ActingIdentity(value.to_string()))
}

fn unauthenticated() -> Response {
    let payload = json!({
        "error": format!("missing acting identity ({ACTING_IDENTITY_HEADER} header)"),
    });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

// Malformed bodies (unknown statuses or intents included) are a caller
// mistake, so they map to 400 rather than axum's default 422.
fn bad_request(rejection: JsonRejection) -> Response {
    let payload = json!({ "error": rejection.body_text() });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn error_response(error: LifecycleError) -> Response {
    let status = match &error {
        LifecycleError::InvalidIdentifier(_) | LifecycleError::MissingPayload { .. } => {
            StatusCode::BAD_REQUEST
        }
        LifecycleError::TerminalState(_) => StatusCode::CONFLICT,
        LifecycleError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        LifecycleError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        LifecycleError::Store(StoreError::Unavailable(_)) | LifecycleError::Claims(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn create_handler<S, C>(
    State(service): State<Arc<LifecycleService<S, C>>>,
    headers: HeaderMap,
    body: Result<axum::Json<CreateItemRequest>, JsonRejection>,
) -> Response
where
    S: ItemStore + 'static,
    C: ClaimStore + 'static,
{
    if acting_identity(&headers).is_none() {
        return unauthenticated();
    }
    let request = match body {
        Ok(axum::Json(request)) => request,
        Err(rejection) => return bad_request(rejection),
    };

    match service.create(request.kind, request.counterpart_email) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<S, C>(
    State(service): State<Arc<LifecycleService<S, C>>>,
    Path(item_id): Path<String>,
) -> Response
where
    S: ItemStore + 'static,
    C: ClaimStore + 'static,
{
    match service.get(&ItemId(item_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<S, C>(
    State(service): State<Arc<LifecycleService<S, C>>>,
    Path(item_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: ItemStore + 'static,
    C: ClaimStore + 'static,
{
    if acting_identity(&headers).is_none() {
        return unauthenticated();
    }

    let id = ItemId(item_id);
    match service.delete(&id) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "item_id": id.0, "deleted": true })),
        )
            .into_response(),
        Err(LifecycleError::Store(StoreError::Conflict)) => {
            let payload = json!({ "error": "only items still in 'new' can be deleted" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<S, C>(
    State(service): State<Arc<LifecycleService<S, C>>>,
    Path(item_id): Path<String>,
    headers: HeaderMap,
    body: Result<axum::Json<TransitionRequest>, JsonRejection>,
) -> Response
where
    S: ItemStore + 'static,
    C: ClaimStore + 'static,
{
    let Some(actor) = acting_identity(&headers) else {
        return unauthenticated();
    };
    let request = match body {
        Ok(axum::Json(request)) => request,
        Err(rejection) => return bad_request(rejection),
    };

    match service.transition(&actor, &ItemId(item_id), &request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn claims_handler<S, C>(
    State(service): State<Arc<LifecycleService<S, C>>>,
    Path(email): Path<String>,
) -> Response
where
    S: ItemStore + 'static,
    C: ClaimStore + 'static,
{
    let admin = ActingIdentity(email);
    match service.claims_for(&admin) {
        Ok(claims) => {
            let payload = json!({ "admin": admin.0, "claims": claims });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

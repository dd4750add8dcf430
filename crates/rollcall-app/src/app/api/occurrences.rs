//! Listing, updating and clearing occurrences.

use rollcall_core::constants::OCCURRENCES_ROUTE_COMPONENT;
use rollcall_service::model::{OccurrenceUpdate, OccurrenceView};
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::Serialize;
use uuid::Uuid;

use super::response::{non_empty_query, obtain_store, render_error};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse<'a> {
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<OccurrenceView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub cleared: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// ## Summary
/// GET /api/occurrences?title= - Occurrences in stored order, optionally
/// limited to one subject.
#[handler]
#[tracing::instrument(skip_all, fields(method = "GET", path = %req.uri().path()))]
async fn list_occurrences(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let title = non_empty_query(req, "title");
    let Some(store) = obtain_store(depot, res) else {
        return;
    };
    let store = store.lock().await;
    let occurrences = match title.as_deref() {
        Some(title) => store.list_by_title(title),
        None => store.list(None),
    };
    tracing::debug!(count = occurrences.len(), ?title, "Listing occurrences");
    let views: Vec<OccurrenceView<'_>> =
        occurrences.into_iter().map(OccurrenceView::from).collect();
    res.render(Json(views));
}

/// ## Summary
/// PATCH /api/occurrences/{id} - Applies an `OccurrenceUpdate`.
///
/// An unknown id is not an error: the response is `{"updated": false}`.
///
/// ## Errors
/// Returns HTTP 400 if the id is not a UUID or the body is not a valid update.
#[handler]
#[tracing::instrument(skip_all, fields(method = "PATCH", path = %req.uri().path()))]
async fn update_occurrence(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(id) = req
        .param::<String>("id")
        .and_then(|raw| Uuid::parse_str(&raw).ok())
    else {
        render_error(res, StatusCode::BAD_REQUEST, "Occurrence id must be a UUID");
        return;
    };

    let update: OccurrenceUpdate = match req.parse_json().await {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = ?e, "Failed to parse occurrence update");
            render_error(res, StatusCode::BAD_REQUEST, "Invalid request body");
            return;
        }
    };

    let Some(store) = obtain_store(depot, res) else {
        return;
    };
    let mut store = store.lock().await;
    let response = match store.update(id, &update) {
        Some(outcome) => UpdateResponse {
            updated: true,
            occurrence: store.get(id).map(OccurrenceView::from),
            warning: outcome.warning().map(str::to_string),
        },
        None => UpdateResponse {
            updated: false,
            occurrence: None,
            warning: None,
        },
    };
    tracing::debug!(%id, updated = response.updated, "Processed occurrence update");
    res.render(Json(response));
}

/// ## Summary
/// DELETE /api/occurrences?confirm=true - Removes every occurrence.
///
/// ## Errors
/// Returns HTTP 400, leaving the store untouched, unless `confirm=true`.
#[handler]
#[tracing::instrument(skip_all, fields(method = "DELETE", path = %req.uri().path()))]
async fn clear_occurrences(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    if req.query::<bool>("confirm") != Some(true) {
        render_error(
            res,
            StatusCode::BAD_REQUEST,
            "Clearing all occurrences requires confirm=true",
        );
        return;
    }

    let Some(store) = obtain_store(depot, res) else {
        return;
    };
    let mut store = store.lock().await;
    let cleared = store.len();
    let outcome = store.clear_all();
    tracing::info!(cleared, "Cleared all occurrences");
    res.render(Json(ClearResponse {
        cleared,
        warning: outcome.warning().map(str::to_string),
    }));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(OCCURRENCES_ROUTE_COMPONENT)
        .get(list_occurrences)
        .delete(clear_occurrences)
        .push(Router::with_path("{id}").patch(update_occurrence))
}

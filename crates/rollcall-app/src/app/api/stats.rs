use rollcall_core::constants::{STATS_ROUTE_COMPONENT, SUBJECTS_ROUTE_COMPONENT};
use rollcall_service::stats::{Stats, compute_stats, stats_by_subject};
use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::Serialize;

use super::response::{non_empty_query, obtain_store};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Every subject.
    pub all: Stats,
    /// The selected subject, or every subject when none is selected.
    pub selected: Stats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// ## Summary
/// GET /api/stats?title= - Statistics over all occurrences and over the
/// selected subject.
#[handler]
#[tracing::instrument(skip_all, fields(method = "GET", path = %req.uri().path()))]
async fn stats(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let title = non_empty_query(req, "title");
    let Some(store) = obtain_store(depot, res) else {
        return;
    };
    let store = store.lock().await;

    let all = compute_stats(store.all());
    let selected = match title.as_deref() {
        Some(title) => compute_stats(store.list_by_title(title)),
        None => compute_stats(store.all()),
    };
    res.render(Json(StatsResponse {
        all,
        selected,
        title,
    }));
}

/// ## Summary
/// GET /api/stats/subjects - One statistics entry per subject, by title.
#[handler]
async fn subject_stats(depot: &mut Depot, res: &mut Response) {
    let Some(store) = obtain_store(depot, res) else {
        return;
    };
    let store = store.lock().await;
    res.render(Json(stats_by_subject(store.all())));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(STATS_ROUTE_COMPONENT)
        .get(stats)
        .push(Router::with_path(SUBJECTS_ROUTE_COMPONENT).get(subject_stats))
}

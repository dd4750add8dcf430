use rollcall_core::constants::SUBJECTS_ROUTE_COMPONENT;
use salvo::{Depot, Response, Router, handler, writing::Json};

use super::response::obtain_store;

/// ## Summary
/// GET /api/subjects - Distinct titles in first-seen order, for the filter.
#[handler]
async fn list_subjects(depot: &mut Depot, res: &mut Response) {
    let Some(store) = obtain_store(depot, res) else {
        return;
    };
    let store = store.lock().await;
    res.render(Json(store.subjects()));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(SUBJECTS_ROUTE_COMPONENT).get(list_subjects)
}

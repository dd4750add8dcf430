//! Schedule import endpoint.

use rollcall_core::constants::SCHEDULE_ROUTE_COMPONENT;
use rollcall_service::schedule::{ExpansionOptions, ScheduleImport, SkippedBlock, parse_schedule};
use rollcall_service::store::ImportSummary;
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::Serialize;

use super::response::{obtain_store, render_error};
use crate::config::get_config_from_depot;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    #[serde(flatten)]
    pub summary: ImportSummary,
    pub skipped: Vec<SkippedBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// ## Summary
/// POST /api/schedule/import - Parses an iCalendar document and appends the
/// resulting occurrences to the store.
///
/// Broken blocks are listed under `skipped`; the rest still import.
///
/// ## Errors
/// Returns HTTP 400 if the body exceeds `import.max_document_bytes` or is not
/// UTF-8 text.
/// Returns HTTP 500 if the store or configuration is missing.
#[handler]
#[tracing::instrument(skip_all, fields(method = "POST", path = %req.uri().path()))]
async fn import_schedule(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let settings = match get_config_from_depot(depot) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get configuration");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            return;
        }
    };

    let limit = settings.import.max_document_bytes;
    let body = match req.payload_with_max_size(limit).await {
        Ok(body) => body.clone(),
        Err(e) => {
            tracing::warn!(error = %e, limit, "Failed to read schedule body");
            render_error(res, StatusCode::BAD_REQUEST, "Invalid request body");
            return;
        }
    };
    let Ok(document) = std::str::from_utf8(&body) else {
        render_error(res, StatusCode::BAD_REQUEST, "Schedule must be UTF-8 text");
        return;
    };

    let options = ExpansionOptions::from_config(&settings.import);
    let ScheduleImport {
        occurrences,
        skipped,
    } = parse_schedule(document, &options);

    let Some(store) = obtain_store(depot, res) else {
        return;
    };
    let summary = store.lock().await.merge_import(occurrences);
    tracing::info!(
        imported = summary.imported,
        duplicates = summary.duplicates,
        skipped = skipped.len(),
        "Imported schedule"
    );

    let warning = summary.persist.warning().map(str::to_string);
    res.render(Json(ImportResponse {
        summary,
        skipped,
        warning,
    }));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(SCHEDULE_ROUTE_COMPONENT)
        .push(Router::with_path("import").post(import_schedule))
}

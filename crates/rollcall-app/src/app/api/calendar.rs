use chrono::{Datelike, NaiveDate};
use rollcall_core::constants::CALENDAR_ROUTE_COMPONENT;
use rollcall_service::calendar::{DayView, month_view, shift_month};
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::Serialize;

use super::response::{obtain_store, render_error};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse<'a> {
    pub year: i32,
    pub month: u32,
    pub today: NaiveDate,
    pub days: Vec<DayView<'a>>,
}

/// Month to show: `year`/`month` when given (missing parts default to
/// today's), shifted by `delta` months.
fn resolve_month(
    today: NaiveDate,
    year: Option<i32>,
    month: Option<u32>,
    delta: i32,
) -> Option<NaiveDate> {
    let reference = NaiveDate::from_ymd_opt(
        year.unwrap_or_else(|| today.year()),
        month.unwrap_or_else(|| today.month()),
        1,
    )?;
    shift_month(&reference, delta)
}

/// ## Summary
/// GET /api/calendar?year=&month=&delta= - The month grid with each day's
/// occurrences.
///
/// ## Errors
/// Returns HTTP 400 if the requested month does not exist or its grid leaves
/// the supported date range.
#[handler]
#[tracing::instrument(skip_all, fields(method = "GET", path = %req.uri().path()))]
async fn calendar(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let today = chrono::Local::now().date_naive();
    let Some(reference) = resolve_month(
        today,
        req.query::<i32>("year"),
        req.query::<u32>("month"),
        req.query::<i32>("delta").unwrap_or(0),
    ) else {
        render_error(res, StatusCode::BAD_REQUEST, "Invalid year or month");
        return;
    };

    let Some(store) = obtain_store(depot, res) else {
        return;
    };
    let store = store.lock().await;
    let Some(days) = month_view(&reference, &today, store.all()) else {
        render_error(res, StatusCode::BAD_REQUEST, "Invalid year or month");
        return;
    };
    tracing::debug!(%reference, days = days.len(), "Projected month");
    res.render(Json(CalendarResponse {
        year: reference.year(),
        month: reference.month(),
        today,
        days,
    }));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CALENDAR_ROUTE_COMPONENT).get(calendar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn defaults_to_current_month() {
        assert_eq!(
            resolve_month(date(2026, 10, 19), None, None, 0),
            Some(date(2026, 10, 1))
        );
    }

    #[test]
    fn delta_moves_from_requested_month() {
        assert_eq!(
            resolve_month(date(2026, 10, 19), Some(2026), Some(1), -1),
            Some(date(2025, 12, 1))
        );
        assert_eq!(
            resolve_month(date(2026, 10, 19), None, Some(12), 1),
            Some(date(2027, 1, 1))
        );
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert_eq!(resolve_month(date(2026, 10, 19), Some(2026), Some(13), 0), None);
        assert_eq!(resolve_month(date(2026, 10, 19), Some(2026), Some(0), 0), None);
    }
}

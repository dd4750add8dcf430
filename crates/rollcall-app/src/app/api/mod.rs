mod app_specific;
mod calendar;
mod occurrences;
mod response;
mod schedule;
mod stats;
mod subjects;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod stats_tests;

use salvo::Router;

use rollcall_core::constants::API_ROUTE_COMPONENT;

/// ## Summary
/// Constructs the API router with every attendance endpoint.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(app_specific::routes())
        .push(schedule::routes())
        .push(occurrences::routes())
        .push(stats::routes())
        .push(subjects::routes())
        .push(calendar::routes())
}

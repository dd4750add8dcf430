use std::sync::Arc;

use rollcall_core::error::CoreError;
use rollcall_service::store::AttendanceStore;
use salvo::async_trait;
use tokio::sync::Mutex;

use crate::error::AppResult;

/// The store shared by every request. Holding the lock covers a whole
/// read-modify-persist sequence.
pub type SharedStore = Arc<Mutex<AttendanceStore>>;

pub struct StoreHandler {
    pub store: SharedStore,
}

impl StoreHandler {
    #[must_use]
    pub fn new(store: AttendanceStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

#[async_trait]
impl salvo::Handler for StoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.store));
    }
}

/// ## Summary
/// Retrieves the attendance store from the depot.
///
/// ## Errors
/// Returns an error if the store is not found in the depot.
pub fn get_store_from_depot(depot: &salvo::Depot) -> AppResult<SharedStore> {
    depot
        .obtain::<SharedStore>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Attendance store not found in depot").into())
}

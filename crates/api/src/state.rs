//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::AddressStore;
use crate::services::AddressService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The store is injected by the
/// host process, which also owns its connection pool.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    addresses: AddressService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `store` - Address storage backend
    /// * `require_list_filter` - Refuse list requests without any filter
    #[must_use]
    pub fn new(store: Arc<dyn AddressStore>, require_list_filter: bool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                addresses: AddressService::new(store, require_list_filter),
            }),
        }
    }

    /// Get a reference to the address service.
    #[must_use]
    pub fn addresses(&self) -> &AddressService {
        &self.inner.addresses
    }
}

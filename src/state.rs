use crate::storage::ItemStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }
}

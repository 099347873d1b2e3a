use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use patient_lookup_cell::create_lookup_router;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "MediQueue lookup API is running!" }))
        .nest("/lookup", create_lookup_router(state))
}

use std::sync::Arc;
use axum::{routing::get, Router};
use shared_config::AppConfig;

use crate::handlers::*;

pub fn create_lookup_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/search", get(search_patient))
        .route("/patients/{uid}/records/{record_id}/download", get(download_prescription))
        .route("/patients/{uid}/records/{record_id}/print", get(print_prescription))
        .with_state(config)
}

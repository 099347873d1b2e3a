use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use tracing::warn;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::error::LookupError;
use crate::models::{LookupResponse, MedicalHistory, Patient, SearchParams};
use crate::services::{
    DocumentGenerator, ExportService, MemorySink, PatientLookupService, PrintView, SearchCriteria,
};

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

fn bearer_token(auth: &BearerHeader) -> Option<&str> {
    auth.as_ref().map(|TypedHeader(header)| header.token())
}

#[axum::debug_handler]
pub async fn search_patient(
    State(config): State<Arc<AppConfig>>,
    auth: BearerHeader,
    Query(params): Query<SearchParams>,
) -> Result<Json<LookupResponse>, AppError> {
    let service = PatientLookupService::new(&config);

    let result = service.search(&params.q, bearer_token(&auth)).await?;

    Ok(Json(LookupResponse::from(result)))
}

#[axum::debug_handler]
pub async fn download_prescription(
    State(config): State<Arc<AppConfig>>,
    auth: BearerHeader,
    Path((uid, record_id)): Path<(String, Uuid)>,
) -> Result<Response, AppError> {
    let (patient, record) = load_record(&config, &uid, record_id, bearer_token(&auth)).await?;

    let sink = MemorySink::new();
    let exporter = ExportService::new(DocumentGenerator::from_config(&config));
    exporter.download_record(&sink, &record, &patient)?;

    let document = sink
        .take_last()
        .ok_or_else(|| AppError::from(LookupError::Export("download produced no document".into())))?;

    Ok(document.into_response())
}

#[axum::debug_handler]
pub async fn print_prescription(
    State(config): State<Arc<AppConfig>>,
    auth: BearerHeader,
    Path((uid, record_id)): Path<(String, Uuid)>,
) -> Result<Response, AppError> {
    let (patient, record) = load_record(&config, &uid, record_id, bearer_token(&auth)).await?;

    let sink = MemorySink::new();
    let exporter = ExportService::new(DocumentGenerator::from_config(&config));
    if exporter.print_record(&sink, &record, &patient)? == PrintView::Blocked {
        warn!("Print view unavailable for medical record {}", record_id);
    }

    let document = sink
        .take_last()
        .ok_or_else(|| AppError::from(LookupError::Export("print view produced no document".into())))?;

    Ok(document.into_response())
}

async fn load_record(
    config: &AppConfig,
    uid: &str,
    record_id: Uuid,
    auth_token: Option<&str>,
) -> Result<(Patient, MedicalHistory), LookupError> {
    let service = PatientLookupService::new(config);
    let criteria = SearchCriteria::ByUid(uid.trim().to_uppercase());

    let patient = service.resolver().resolve_criteria(&criteria, auth_token).await?;
    let record = service
        .aggregator()
        .history_record(&patient, record_id, auth_token)
        .await?;

    Ok((patient, record))
}

//! Operator-facing lookup state.
//!
//! A session owns what is currently on screen. Each search replaces that
//! state wholesale, success or failure, and only one search may be in
//! flight at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::LookupError;
use crate::models::{LookupResult, MedicalHistory, Patient, Visit};
use crate::services::document::DocumentGenerator;
use crate::services::export::{ExportService, ExportSink, PrintView};
use crate::services::lookup::PatientLookupService;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupState {
    pub patient: Option<Patient>,
    pub visits: Vec<Visit>,
    pub history: Vec<MedicalHistory>,
    pub error: Option<String>,
}

impl LookupState {
    fn loaded(result: LookupResult) -> Self {
        Self {
            patient: Some(result.patient),
            visits: result.records.visits,
            history: result.records.history,
            error: None,
        }
    }

    fn failed(error: &LookupError) -> Self {
        Self {
            error: Some(error.user_message().to_string()),
            ..Self::default()
        }
    }

    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    pub fn find_history(&self, record_id: Uuid) -> Option<&MedicalHistory> {
        self.history.iter().find(|record| record.id == record_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Blank query; nothing was sent and nothing changed.
    Ignored,
    /// Another search is still running; this one was dropped.
    Busy,
    Found(LookupResult),
    Failed(LookupError),
}

/// Clears the loading flag when the search ends, however it ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct LookupSession {
    service: PatientLookupService,
    exporter: ExportService,
    state: Mutex<LookupState>,
    loading: AtomicBool,
}

impl LookupSession {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_parts(
            PatientLookupService::new(config),
            ExportService::new(DocumentGenerator::from_config(config)),
        )
    }

    pub fn with_parts(service: PatientLookupService, exporter: ExportService) -> Self {
        Self {
            service,
            exporter,
            state: Mutex::new(LookupState::default()),
            loading: AtomicBool::new(false),
        }
    }

    pub fn exporter(&self) -> &ExportService {
        &self.exporter
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> LookupState {
        self.lock().clone()
    }

    pub fn reset(&self) {
        self.replace(LookupState::default());
    }

    pub async fn search(&self, query: &str, auth_token: Option<&str>) -> SearchOutcome {
        if query.trim().is_empty() {
            debug!("Ignoring empty search");
            return SearchOutcome::Ignored;
        }

        let Some(_loading) = LoadingGuard::acquire(&self.loading) else {
            debug!("Search already in progress, ignoring new request");
            return SearchOutcome::Busy;
        };

        self.replace(LookupState::default());

        match self.service.search(query, auth_token).await {
            Ok(result) => {
                self.replace(LookupState::loaded(result.clone()));
                SearchOutcome::Found(result)
            }
            Err(error) => {
                self.replace(LookupState::failed(&error));
                SearchOutcome::Failed(error)
            }
        }
    }

    /// Downloads a record of the displayed patient; returns the filename used.
    pub fn download(&self, record_id: Uuid, sink: &dyn ExportSink) -> Result<String, LookupError> {
        let state = self.snapshot();
        let (record, patient) = displayed_record(&state, record_id)?;
        self.exporter.download_record(sink, record, patient)
    }

    pub fn print(&self, record_id: Uuid, sink: &dyn ExportSink) -> Result<PrintView, LookupError> {
        let state = self.snapshot();
        let (record, patient) = displayed_record(&state, record_id)?;
        self.exporter.print_record(sink, record, patient)
    }

    fn replace(&self, next: LookupState) {
        *self.lock() = next;
    }

    fn lock(&self) -> MutexGuard<'_, LookupState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn displayed_record(state: &LookupState, record_id: Uuid) -> Result<(&MedicalHistory, &Patient), LookupError> {
    let patient = state.patient.as_ref().ok_or(LookupError::NotFound)?;
    let record = state
        .find_history(record_id)
        .ok_or(LookupError::RecordNotFound(record_id))?;
    Ok((record, patient))
}

use tracing::{debug, error, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{Order, SupabaseClient, TableQuery};

use crate::error::LookupError;
use crate::models::{MedicalHistory, Patient, PatientRecords, Visit};

const VISIT_COLUMNS: &str = "*, doctor:doctors(*), payment_transactions(*)";
const HISTORY_COLUMNS: &str = "*, doctor:doctors(*), visit:visits(*)";

pub fn visits_query(patient: &Patient) -> TableQuery {
    TableQuery::from("visits")
        .select(VISIT_COLUMNS)
        .eq("patient_id", patient.id.to_string())
        .order("created_at", Order::Descending)
}

pub fn history_query(patient: &Patient) -> TableQuery {
    TableQuery::from("medical_history")
        .select(HISTORY_COLUMNS)
        .eq("patient_uid", patient.uid.as_str())
        .order("created_at", Order::Descending)
}

#[derive(Clone)]
pub struct RecordAggregator {
    supabase: SupabaseClient,
}

impl RecordAggregator {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(SupabaseClient::new(config))
    }

    pub fn with_client(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    /// Loads visits and clinical history. Both fetches must succeed; on any
    /// failure neither list is returned.
    pub async fn aggregate(
        &self,
        patient: &Patient,
        auth_token: Option<&str>,
    ) -> Result<PatientRecords, LookupError> {
        debug!("Aggregating records for patient {}", patient.uid);

        let visits_query = visits_query(patient);
        let history_query = history_query(patient);

        let (visits, history) = tokio::try_join!(
            self.supabase.select::<Visit>(&visits_query, auth_token),
            self.supabase.select::<MedicalHistory>(&history_query, auth_token),
        )
        .map_err(|e| {
            error!("Failed to load records for patient {}: {}", patient.uid, e);
            LookupError::AggregationFailure(e.to_string())
        })?;

        let records = PatientRecords::new(visits, history);
        info!(
            "Loaded {} visits and {} medical records for patient {}",
            records.visit_count(),
            records.history_count(),
            patient.uid
        );

        Ok(records)
    }

    /// Single clinical record, scoped to the patient it belongs to.
    pub async fn history_record(
        &self,
        patient: &Patient,
        record_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<MedicalHistory, LookupError> {
        let query = history_query(patient).eq("id", record_id.to_string()).limit(1);

        let rows: Vec<MedicalHistory> = self
            .supabase
            .select(&query, auth_token)
            .await
            .map_err(|e| {
                error!("Failed to load medical record {}: {}", record_id, e);
                LookupError::QueryFailure(e.to_string())
            })?;

        rows.into_iter()
            .next()
            .ok_or(LookupError::RecordNotFound(record_id))
    }
}

use tracing::debug;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::error::LookupError;
use crate::models::LookupResult;
use crate::services::aggregator::RecordAggregator;
use crate::services::resolver::{SearchCriteria, SearchResolver};

/// Resolve-then-aggregate pipeline for one search request.
#[derive(Clone)]
pub struct PatientLookupService {
    resolver: SearchResolver,
    aggregator: RecordAggregator,
}

impl PatientLookupService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = SupabaseClient::new(config);
        Self {
            resolver: SearchResolver::with_client(supabase.clone()),
            aggregator: RecordAggregator::with_client(supabase),
        }
    }

    pub fn resolver(&self) -> &SearchResolver {
        &self.resolver
    }

    pub fn aggregator(&self) -> &RecordAggregator {
        &self.aggregator
    }

    pub async fn search(&self, query: &str, auth_token: Option<&str>) -> Result<LookupResult, LookupError> {
        let criteria = SearchCriteria::classify(query).ok_or(LookupError::EmptyQuery)?;
        debug!("Patient lookup by {}", criteria.kind());

        let patient = self.resolver.resolve_criteria(&criteria, auth_token).await?;
        let records = self.aggregator.aggregate(&patient, auth_token).await?;

        Ok(LookupResult { patient, records })
    }
}

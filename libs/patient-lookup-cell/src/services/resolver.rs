use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::{SupabaseClient, TableQuery};

use crate::error::LookupError;
use crate::models::Patient;

/// Prefix of every clinic-issued patient UID.
pub const UID_PREFIX: &str = "CLN1-";

/// How a raw search token is matched against `patients`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// Exact match on the uppercased UID.
    ByUid(String),
    /// Exact match on the phone number.
    ByPhone(String),
    /// Case-insensitive substring match on the name.
    ByName(String),
}

impl SearchCriteria {
    /// Rules are tried in order: UID prefix, all digits, then name.
    /// Returns `None` for a blank token.
    pub fn classify(raw: &str) -> Option<Self> {
        let token = raw.trim();
        if token.is_empty() {
            return None;
        }

        let upper = token.to_uppercase();
        let criteria = if upper.starts_with(UID_PREFIX) {
            SearchCriteria::ByUid(upper)
        } else if token.chars().all(|c| c.is_ascii_digit()) {
            SearchCriteria::ByPhone(token.to_string())
        } else {
            SearchCriteria::ByName(token.to_string())
        };

        Some(criteria)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchCriteria::ByUid(_) => "uid",
            SearchCriteria::ByPhone(_) => "phone",
            SearchCriteria::ByName(_) => "name",
        }
    }

    /// Patient query for this criteria, capped at one row.
    pub fn to_query(&self) -> TableQuery {
        let query = TableQuery::from("patients").select("*");
        let query = match self {
            SearchCriteria::ByUid(uid) => query.eq("uid", uid.as_str()),
            SearchCriteria::ByPhone(phone) => query.eq("phone", phone.as_str()),
            SearchCriteria::ByName(name) => query.ilike_contains("name", name.as_str()),
        };
        query.limit(1)
    }
}

#[derive(Clone)]
pub struct SearchResolver {
    supabase: SupabaseClient,
}

impl SearchResolver {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(SupabaseClient::new(config))
    }

    pub fn with_client(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    pub async fn resolve(&self, query: &str, auth_token: Option<&str>) -> Result<Patient, LookupError> {
        let criteria = SearchCriteria::classify(query).ok_or(LookupError::EmptyQuery)?;
        self.resolve_criteria(&criteria, auth_token).await
    }

    pub async fn resolve_criteria(
        &self,
        criteria: &SearchCriteria,
        auth_token: Option<&str>,
    ) -> Result<Patient, LookupError> {
        debug!("Resolving patient by {}", criteria.kind());

        let rows: Vec<Patient> = self
            .supabase
            .select(&criteria.to_query(), auth_token)
            .await
            .map_err(|e| {
                error!("Patient search by {} failed: {}", criteria.kind(), e);
                LookupError::QueryFailure(e.to_string())
            })?;

        match rows.into_iter().next() {
            Some(patient) => {
                info!("Resolved patient {} by {}", patient.uid, criteria.kind());
                Ok(patient)
            }
            None => {
                warn!("No patient matched search by {}", criteria.kind());
                Err(LookupError::NotFound)
            }
        }
    }
}

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub uid: String,
    pub name: String,
    pub age: i32,
    pub phone: String,
    pub email: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub medical_conditions: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn allergies(&self) -> &[String] {
        self.allergies.as_deref().unwrap_or_default()
    }

    pub fn medical_conditions(&self) -> &[String] {
        self.medical_conditions.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub specialization: Option<String>,
    pub qualification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VisitStatus {
    Waiting,
    InService,
    Completed,
    Other(String),
}

impl From<String> for VisitStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "waiting" => VisitStatus::Waiting,
            "in_service" => VisitStatus::InService,
            "completed" => VisitStatus::Completed,
            _ => VisitStatus::Other(value),
        }
    }
}

impl From<VisitStatus> for String {
    fn from(value: VisitStatus) -> Self {
        value.as_str().to_string()
    }
}

impl VisitStatus {
    pub fn as_str(&self) -> &str {
        match self {
            VisitStatus::Waiting => "waiting",
            VisitStatus::InService => "in_service",
            VisitStatus::Completed => "completed",
            VisitStatus::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Other(String),
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "paid" => PaymentStatus::Paid,
            "pending" => PaymentStatus::Pending,
            _ => PaymentStatus::Other(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(value: PaymentStatus) -> Self {
        value.as_str().to_string()
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Other(raw) => raw,
        }
    }
}

/// `in_service` -> `IN SERVICE`
fn status_label(raw: &str) -> String {
    raw.replacen('_', " ", 1).to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub visit_id: Option<Uuid>,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub stn: i32,
    pub department: String,
    pub visit_date: NaiveDate,
    pub status: VisitStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub doctor: Option<Doctor>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub payment_transactions: Vec<PaymentTransaction>,
}

impl Visit {
    /// Total collected for the visit. Always derived from the transactions,
    /// summed in whole paise so fractional amounts do not drift.
    pub fn total_paid(&self) -> f64 {
        let paise: i64 = self
            .payment_transactions
            .iter()
            .map(|t| (t.amount * 100.0).round() as i64)
            .sum();
        paise as f64 / 100.0
    }

    pub fn has_payments(&self) -> bool {
        !self.payment_transactions.is_empty()
    }

    pub fn department_label(&self) -> String {
        let mut chars = self.department.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn status_label(&self) -> String {
        status_label(self.status.as_str())
    }

    pub fn payment_label(&self) -> String {
        status_label(self.payment_status.as_str())
    }
}

/// One clinical record entry; conceptually a prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistory {
    pub id: Uuid,
    pub patient_uid: String,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub doctor: Option<Doctor>,
    #[serde(default)]
    pub visit: Option<Visit>,
}

/// A patient's visits and clinical history, each newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientRecords {
    pub visits: Vec<Visit>,
    pub history: Vec<MedicalHistory>,
}

impl PatientRecords {
    pub fn new(mut visits: Vec<Visit>, mut history: Vec<MedicalHistory>) -> Self {
        visits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { visits, history }
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

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    pub patient: Patient,
    pub records: PatientRecords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTab {
    Visits,
    History,
}

impl fmt::Display for LookupTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupTab::Visits => f.write_str("Visit History"),
            LookupTab::History => f.write_str("Medical Records"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitEntry {
    #[serde(flatten)]
    pub visit: Visit,
    pub total_paid: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabCounts {
    pub visits: usize,
    pub history: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    pub patient: Patient,
    pub visits: Vec<VisitEntry>,
    pub history: Vec<MedicalHistory>,
    pub counts: TabCounts,
}

impl From<LookupResult> for LookupResponse {
    fn from(result: LookupResult) -> Self {
        let counts = TabCounts {
            visits: result.records.visit_count(),
            history: result.records.history_count(),
        };
        let visits = result
            .records
            .visits
            .into_iter()
            .map(|visit| VisitEntry {
                total_paid: visit.total_paid(),
                visit,
            })
            .collect();

        Self {
            patient: result.patient,
            visits,
            history: result.records.history,
            counts,
        }
    }
}

// Numeric columns come back as JSON numbers or, for `numeric`, as strings.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(value) => Ok(value),
        Amount::Text(raw) => raw.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn visit_json(amounts: serde_json::Value) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "stn": 12,
            "department": "cardiology",
            "visit_date": "2024-03-05",
            "status": "in_service",
            "payment_status": "partially_paid",
            "created_at": "2024-03-05T04:00:00Z",
            "doctor": null,
            "payment_transactions": amounts
        })
    }

    #[test]
    fn total_paid_sums_numbers_and_numeric_strings() {
        let visit: Visit = serde_json::from_value(visit_json(json!([
            { "amount": 100 },
            { "amount": "50.00" }
        ])))
        .unwrap();

        assert_eq!(visit.total_paid(), 150.0);
    }

    #[test]
    fn total_paid_keeps_paise_exact() {
        let visit: Visit = serde_json::from_value(visit_json(json!([
            { "amount": 0.1 },
            { "amount": "0.20" }
        ])))
        .unwrap();

        assert_eq!(visit.total_paid(), 0.3);
        assert_eq!(shared_utils::format_amount(visit.total_paid()), "₹0.30");
    }

    #[test]
    fn null_transactions_mean_nothing_collected() {
        let visit: Visit = serde_json::from_value(visit_json(json!(null))).unwrap();
        assert!(!visit.has_payments());
        assert_eq!(visit.total_paid(), 0.0);
    }

    #[test]
    fn labels() {
        let visit: Visit = serde_json::from_value(visit_json(json!([]))).unwrap();
        assert_eq!(visit.status, VisitStatus::InService);
        assert_eq!(visit.status_label(), "IN SERVICE");
        assert_eq!(visit.payment_status, PaymentStatus::Other("partially_paid".into()));
        assert_eq!(visit.payment_label(), "PARTIALLY PAID");
        assert_eq!(visit.department_label(), "Cardiology");
    }

    #[test]
    fn unknown_status_round_trips() {
        let status = VisitStatus::from("referred".to_string());
        assert_eq!(String::from(status), "referred");
    }

    #[test]
    fn records_are_ordered_newest_first() {
        let history = |day: u32| MedicalHistory {
            id: Uuid::new_v4(),
            patient_uid: "CLN1-0001".into(),
            diagnosis: None,
            prescription: None,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            doctor: None,
            visit: None,
        };

        let records = PatientRecords::new(Vec::new(), vec![history(1), history(9), history(4)]);
        let days: Vec<_> = records.history.iter().map(|h| h.created_at.format("%d").to_string()).collect();

        assert_eq!(days, ["09", "04", "01"]);
        assert_eq!(records.history_count(), 3);
        assert_eq!(records.visit_count(), 0);
    }
}

#![allow(dead_code)]

use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

pub const VISIT_SELECT: &str = "*,doctor:doctors(*),payment_transactions(*)";
pub const HISTORY_SELECT: &str = "*,doctor:doctors(*),visit:visits(*)";

pub struct TestStore {
    pub server: MockServer,
    pub config: AppConfig,
}

impl TestStore {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let config = TestConfig::with_url(&server.uri()).to_app_config();
        Self { server, config }
    }

    /// Answers `patients?{column}=eq|ilike.{value}` with `rows`.
    pub async fn mount_patients(&self, column: &str, filter: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/patients"))
            .and(query_param(column, filter))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_visits(&self, patient_id: &Uuid, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/visits"))
            .and(query_param("select", VISIT_SELECT))
            .and(query_param("patient_id", format!("eq.{}", patient_id)))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_history(&self, patient_uid: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/medical_history"))
            .and(query_param("select", HISTORY_SELECT))
            .and(query_param("patient_uid", format!("eq.{}", patient_uid)))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    pub async fn fail_table(&self, table: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{}", table)))
            .respond_with(ResponseTemplate::new(status).set_body_json(
                MockSupabaseResponses::error_response("backend unavailable", "PGRST000"),
            ))
            .mount(&self.server)
            .await;
    }
}

pub struct PatientFixture {
    pub id: Uuid,
    pub uid: String,
    pub name: String,
    pub phone: String,
}

impl PatientFixture {
    pub fn new(uid: &str, name: &str, phone: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            uid: uid.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }

    pub fn row(&self) -> Value {
        MockSupabaseResponses::patient_response(&self.id, &self.uid, &self.name, &self.phone)
    }

    pub fn rows(&self) -> Value {
        json!([self.row()])
    }

    pub fn visit(&self, stn: i32, created_at: &str, amounts: &[f64]) -> Value {
        MockSupabaseResponses::visit_response(&self.id, stn, created_at, amounts)
    }

    pub fn history(&self, created_at: &str, diagnosis: Option<&str>) -> Value {
        MockSupabaseResponses::medical_history_response(&self.uid, created_at, diagnosis)
    }
}

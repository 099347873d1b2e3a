use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            ..AppConfig::default()
        }
    }
}

/// Row shapes as the store returns them, embeds included.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn patient_response(id: &Uuid, uid: &str, name: &str, phone: &str) -> Value {
        json!({
            "id": id,
            "uid": uid,
            "name": name,
            "age": 42,
            "phone": phone,
            "email": null,
            "blood_group": "B+",
            "emergency_contact": null,
            "allergies": ["Penicillin"],
            "medical_conditions": [],
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn doctor_response(name: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "name": name,
            "specialization": "General Medicine",
            "qualification": "MBBS, MD"
        })
    }

    pub fn visit_response(patient_id: &Uuid, stn: i32, created_at: &str, amounts: &[f64]) -> Value {
        let visit_id = Uuid::new_v4();
        let transactions: Vec<Value> = amounts
            .iter()
            .map(|amount| json!({
                "id": Uuid::new_v4(),
                "visit_id": visit_id,
                "amount": amount,
                "payment_method": "cash",
                "created_at": created_at
            }))
            .collect();

        json!({
            "id": visit_id,
            "patient_id": patient_id,
            "stn": stn,
            "department": "general",
            "visit_date": &created_at[..10],
            "status": "completed",
            "payment_status": "paid",
            "created_at": created_at,
            "doctor": Self::doctor_response("Asha Menon"),
            "payment_transactions": transactions
        })
    }

    pub fn medical_history_response(patient_uid: &str, created_at: &str, diagnosis: Option<&str>) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "patient_uid": patient_uid,
            "diagnosis": diagnosis,
            "prescription": "Paracetamol 500mg\n  1-0-1 after food",
            "notes": null,
            "created_at": created_at,
            "doctor": Self::doctor_response("Asha Menon"),
            "visit": null
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default().to_app_config();

        assert_eq!(config.supabase_url, "http://localhost:54321");
        assert_eq!(config.supabase_anon_key, "test-anon-key");
        assert!(config.is_configured());
    }

    #[test]
    fn visit_fixture_carries_transactions() {
        let patient_id = Uuid::new_v4();
        let visit = MockSupabaseResponses::visit_response(&patient_id, 7, "2024-03-05T04:00:00Z", &[100.0, 50.0]);

        assert_eq!(visit["payment_transactions"].as_array().map(Vec::len), Some(2));
        assert_eq!(visit["visit_date"], "2024-03-05");
    }
}

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use patient_lookup_cell::*;
use common::{PatientFixture, TestStore};

async fn loaded_session(store: &TestStore, fixture: &PatientFixture) -> LookupSession {
    store.mount_patients("uid", &format!("eq.{}", fixture.uid), fixture.rows()).await;
    store
        .mount_visits(&fixture.id, json!([fixture.visit(3, "2024-03-05T04:00:00Z", &[100.0, 50.0])]))
        .await;
    store
        .mount_history(&fixture.uid, json!([fixture.history("2024-03-05T04:30:00Z", None)]))
        .await;

    let session = LookupSession::new(&store.config);
    assert_matches!(session.search(&fixture.uid, None).await, SearchOutcome::Found(_));
    session
}

#[tokio::test]
async fn test_blank_search_is_a_no_op() {
    let store = TestStore::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&store.server)
        .await;

    let session = LookupSession::new(&store.config);
    let before = session.snapshot();

    assert_eq!(session.search("", None).await, SearchOutcome::Ignored);
    assert_eq!(session.search("  \t ", None).await, SearchOutcome::Ignored);
    assert_eq!(session.snapshot(), before);
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_unknown_uid_clears_every_list() {
    let store = TestStore::start().await;
    let fixture = PatientFixture::new("CLN1-0007", "Meera Nair", "9876543210");
    let session = loaded_session(&store, &fixture).await;
    assert!(session.snapshot().patient.is_some());

    store.mount_patients("uid", "eq.CLN1-0042", json!([])).await;
    let outcome = session.search("CLN1-0042", None).await;

    assert_eq!(outcome, SearchOutcome::Failed(LookupError::NotFound));
    let state = session.snapshot();
    assert!(state.patient.is_none());
    assert!(state.visits.is_empty());
    assert!(state.history.is_empty());
    assert_eq!(state.error.as_deref(), Some("Patient not found. Please check the search criteria."));
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_phone_search_shows_both_visits_newest_first() {
    let store = TestStore::start().await;
    let fixture = PatientFixture::new("CLN1-0042", "Ravi Kumar", "9876543210");
    store.mount_patients("phone", "eq.9876543210", fixture.rows()).await;
    store
        .mount_visits(
            &fixture.id,
            json!([
                fixture.visit(4, "2024-01-15T05:00:00Z", &[300.0]),
                fixture.visit(9, "2024-03-05T04:00:00Z", &[100.0, 50.0]),
            ]),
        )
        .await;
    store.mount_history(&fixture.uid, json!([])).await;

    let session = LookupSession::new(&store.config);
    let outcome = session.search("9876543210", None).await;

    assert_matches!(outcome, SearchOutcome::Found(ref result) if result.patient.uid == "CLN1-0042");
    let state = session.snapshot();
    assert_eq!(state.visit_count(), 2);
    assert_eq!(state.history_count(), 0);
    assert_eq!(state.visits[0].stn, 9);
    assert_eq!(state.visits[1].stn, 4);
    assert_eq!(state.visits[0].total_paid(), 150.0);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_aggregation_failure_resets_displayed_state() {
    let store = TestStore::start().await;
    let fixture = PatientFixture::new("CLN1-0042", "Ravi Kumar", "9876543210");
    store.mount_patients("uid", "eq.CLN1-0042", fixture.rows()).await;
    store.mount_visits(&fixture.id, json!([])).await;
    store.fail_table("medical_history", 500).await;

    let session = LookupSession::new(&store.config);
    let outcome = session.search("CLN1-0042", None).await;

    assert_matches!(outcome, SearchOutcome::Failed(LookupError::AggregationFailure(_)));
    let state = session.snapshot();
    assert!(state.patient.is_none());
    assert!(state.visits.is_empty());
    assert_eq!(state.error.as_deref(), Some("Error searching patient. Please try again."));
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_second_search_while_loading_is_refused() {
    let store = TestStore::start().await;
    let fixture = PatientFixture::new("CLN1-0042", "Ravi Kumar", "9876543210");
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixture.rows())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&store.server)
        .await;
    store.mount_visits(&fixture.id, json!([])).await;
    store.mount_history(&fixture.uid, json!([])).await;

    let session = LookupSession::new(&store.config);
    let (first, second) = tokio::join!(
        session.search("CLN1-0042", None),
        session.search("ravi", None),
    );

    assert_matches!(first, SearchOutcome::Found(_));
    assert_eq!(second, SearchOutcome::Busy);
    assert!(!session.is_loading());
    assert_eq!(session.snapshot().patient.map(|p| p.uid), Some("CLN1-0042".to_string()));
}

#[tokio::test]
async fn test_download_and_print_displayed_record() {
    let store = TestStore::start().await;
    let fixture = PatientFixture::new("CLN1-0042", "Ravi Kumar", "9876543210");
    let session = loaded_session(&store, &fixture).await;
    let record_id = session.snapshot().history[0].id;

    let sink = MemorySink::new();
    let filename = session.download(record_id, &sink).unwrap();
    assert_eq!(filename, "prescription-Ravi Kumar-05 Mar 2024.txt");

    assert_eq!(session.print(record_id, &sink).unwrap(), PrintView::Opened);

    let documents = sink.documents();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].kind, ExportKind::Download);
    assert_eq!(documents[0].name, filename);
    assert!(documents[0].content.contains("DIAGNOSIS:\nNot specified"));
    assert!(documents[0].content.contains("Patient ID: CLN1-0042"));

    assert_eq!(documents[1].kind, ExportKind::PrintView);
    assert_eq!(documents[1].name, "Prescription - Ravi Kumar");
    assert!(documents[1].content.contains("<p>Not specified</p>"));
    assert!(!documents[1].content.contains("Additional Notes"));
}

#[tokio::test]
async fn test_blocked_print_view_is_not_an_error() {
    let store = TestStore::start().await;
    let fixture = PatientFixture::new("CLN1-0042", "Ravi Kumar", "9876543210");
    let session = loaded_session(&store, &fixture).await;
    let record_id = session.snapshot().history[0].id;

    let sink = MemorySink::blocking_print_views();

    assert_eq!(session.print(record_id, &sink).unwrap(), PrintView::Blocked);
    assert!(sink.documents().is_empty());
}

#[tokio::test]
async fn test_export_requires_displayed_record() {
    let store = TestStore::start().await;
    let fixture = PatientFixture::new("CLN1-0042", "Ravi Kumar", "9876543210");
    let session = loaded_session(&store, &fixture).await;
    let sink = MemorySink::new();

    let missing = Uuid::new_v4();
    assert_eq!(session.download(missing, &sink), Err(LookupError::RecordNotFound(missing)));

    session.reset();
    let record_id = Uuid::new_v4();
    assert_eq!(session.print(record_id, &sink), Err(LookupError::NotFound));
    assert!(sink.documents().is_empty());
}

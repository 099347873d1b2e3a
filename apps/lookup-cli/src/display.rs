use std::fmt::Write;

use chrono::FixedOffset;

use patient_lookup_cell::{LookupState, LookupTab, MedicalHistory, Patient};
use shared_utils::{format_amount, format_date, format_naive_date, format_time};

pub fn patient_card(patient: &Patient, state: &LookupState, offset: &FixedOffset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Patient Information");
    let _ = writeln!(out, "  Patient ID:  {}", patient.uid);
    let _ = writeln!(out, "  Name:        {}", patient.name);
    let _ = writeln!(out, "  Age:         {}", patient.age);
    let _ = writeln!(out, "  Phone:       {}", patient.phone);
    if let Some(email) = &patient.email {
        let _ = writeln!(out, "  Email:       {}", email);
    }
    if let Some(blood_group) = &patient.blood_group {
        let _ = writeln!(out, "  Blood Group: {}", blood_group);
    }
    if let Some(contact) = &patient.emergency_contact {
        let _ = writeln!(out, "  Emergency:   {}", contact);
    }
    let _ = writeln!(out, "  Registered:  {}", format_date(&patient.created_at, offset));
    if !patient.allergies().is_empty() {
        let _ = writeln!(out, "  Allergies:   {}", patient.allergies().join(", "));
    }
    if !patient.medical_conditions().is_empty() {
        let _ = writeln!(out, "  Conditions:  {}", patient.medical_conditions().join(", "));
    }
    let _ = write!(
        out,
        "{} ({}) | {} ({})",
        LookupTab::Visits,
        state.visit_count(),
        LookupTab::History,
        state.history_count()
    );
    out
}

pub fn visits_tab(state: &LookupState, offset: &FixedOffset) -> String {
    if state.visits.is_empty() {
        return "No visits found for this patient.".to_string();
    }

    let mut out = String::new();
    for visit in &state.visits {
        let _ = writeln!(
            out,
            "Token #{} - {}  [{}]",
            visit.stn,
            visit.department_label(),
            visit.status_label()
        );
        let _ = writeln!(
            out,
            "  {} at {}",
            format_naive_date(&visit.visit_date),
            format_time(&visit.created_at, offset)
        );
        if let Some(doctor) = &visit.doctor {
            let _ = writeln!(out, "  Doctor: {}", doctor.name);
        }
        let _ = write!(out, "  Payment: {}", visit.payment_label());
        if visit.has_payments() {
            let _ = write!(out, "  {}", format_amount(visit.total_paid()));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

pub fn history_tab(state: &LookupState, offset: &FixedOffset) -> String {
    if state.history.is_empty() {
        return "No medical records found for this patient.".to_string();
    }

    let mut out = String::new();
    for (index, record) in state.history.iter().enumerate() {
        let _ = write!(out, "{}. {}", index + 1, format_date(&record.created_at, offset));
        if let Some(doctor) = &record.doctor {
            let _ = write!(out, "  Dr. {}", doctor.name);
        }
        out.push('\n');
        if let Some(diagnosis) = &record.diagnosis {
            let _ = writeln!(out, "   Diagnosis: {}", diagnosis);
        }
    }
    out.trim_end().to_string()
}

pub fn record_detail(record: &MedicalHistory, patient: &Patient, offset: &FixedOffset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Prescription from {}", format_date(&record.created_at, offset));
    let _ = writeln!(
        out,
        "Doctor: {} | Patient: {}",
        record.doctor.as_ref().map(|d| d.name.as_str()).unwrap_or("N/A"),
        patient.name
    );
    if let Some(diagnosis) = &record.diagnosis {
        let _ = writeln!(out, "\nDiagnosis:\n{}", diagnosis);
    }
    if let Some(prescription) = &record.prescription {
        let _ = writeln!(out, "\nPrescription:\n{}", prescription);
    }
    if let Some(notes) = &record.notes {
        let _ = writeln!(out, "\nAdditional Notes:\n{}", notes);
    }
    out.trim_end().to_string()
}

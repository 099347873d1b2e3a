//! Prescription documents for a single clinical record.
//!
//! Both renderers are pure: the only input beyond the record and patient is
//! the clinic identity and, for the text variant, the render time.

use chrono::{DateTime, FixedOffset, Utc};
use handlebars::{Handlebars, RenderError};
use serde::Serialize;

use shared_config::AppConfig;
use shared_utils::{format_date, format_time};

use crate::models::{MedicalHistory, Patient};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_DIAGNOSIS: &str = "Not specified";
pub const NO_PRESCRIPTION: &str = "No prescription provided";
pub const NO_NOTES: &str = "No additional notes";

const PRESCRIPTION_TEMPLATE: &str = include_str!("../../templates/prescription.hbs");
const PRINT_PAGE_TEMPLATE: &str = include_str!("../../templates/print_page.hbs");

#[derive(Debug, Clone)]
pub struct DocumentGenerator {
    clinic_name: String,
    offset: FixedOffset,
}

impl DocumentGenerator {
    pub fn new(clinic_name: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            clinic_name: clinic_name.into(),
            offset,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.clinic_name.clone(), config.clinic_offset())
    }

    pub fn clinic_name(&self) -> &str {
        &self.clinic_name
    }

    /// Patient-facing date of the record, shared by the body and the filename.
    pub fn record_date(&self, history: &MedicalHistory) -> String {
        format_date(&history.created_at, &self.offset)
    }

    pub fn download_filename(&self, history: &MedicalHistory, patient: &Patient) -> String {
        format!("prescription-{}-{}.txt", patient.name, self.record_date(history))
    }

    pub fn print_title(&self, patient: &Patient) -> String {
        format!("Prescription - {}", patient.name)
    }

    pub fn render_text(&self, history: &MedicalHistory, patient: &Patient) -> String {
        self.render_text_at(history, patient, Utc::now())
    }

    pub fn render_text_at(
        &self,
        history: &MedicalHistory,
        patient: &Patient,
        generated_at: DateTime<Utc>,
    ) -> String {
        let fields = Fields::of(history);

        let mut doc = String::new();
        doc.push_str("DIGITAL PRESCRIPTION\n");
        doc.push_str("====================\n\n");
        doc.push_str(&format!("Clinic: {}\n", self.clinic_name));
        doc.push_str(&format!("Date: {}\n\n", self.record_date(history)));

        doc.push_str("PATIENT INFORMATION:\n");
        doc.push_str(&format!("Name: {}\n", patient.name));
        doc.push_str(&format!("Age: {}\n", patient.age));
        doc.push_str(&format!("Phone: {}\n", patient.phone));
        doc.push_str(&format!("Patient ID: {}\n\n", patient.uid));

        doc.push_str("DOCTOR INFORMATION:\n");
        doc.push_str(&format!("Doctor: {}\n", fields.doctor_name));
        doc.push_str(&format!("Specialization: {}\n\n", fields.specialization));

        doc.push_str(&format!("DIAGNOSIS:\n{}\n\n", fields.diagnosis));
        doc.push_str(&format!("PRESCRIPTION:\n{}\n\n", fields.prescription));
        doc.push_str(&format!("ADDITIONAL NOTES:\n{}\n\n", fields.notes.unwrap_or(NO_NOTES)));

        doc.push_str("---\n");
        doc.push_str("This is a digitally generated prescription.\n");
        doc.push_str(&format!(
            "Generated on: {} {}",
            format_date(&generated_at, &self.offset),
            format_time(&generated_at, &self.offset)
        ));

        doc
    }

    /// Printable markup fragment. The notes section is left out entirely when
    /// the record has none.
    pub fn render_printable(
        &self,
        history: &MedicalHistory,
        patient: &Patient,
    ) -> Result<String, RenderError> {
        let fields = Fields::of(history);
        let date = self.record_date(history);

        render(
            PRESCRIPTION_TEMPLATE,
            &PrescriptionView {
                clinic_name: &self.clinic_name,
                date: &date,
                patient_name: &patient.name,
                age: patient.age,
                phone: &patient.phone,
                uid: &patient.uid,
                doctor_name: fields.doctor_name,
                specialization: fields.specialization,
                qualification: fields.qualification,
                diagnosis: fields.diagnosis,
                prescription: fields.prescription,
                notes: fields.notes,
            },
        )
    }

    /// Complete print view: the printable body plus manual Print and Close
    /// controls that are hidden from the printed page.
    pub fn print_page(&self, body: &str, title: &str) -> Result<String, RenderError> {
        render(PRINT_PAGE_TEMPLATE, &PrintPageView { title, body })
    }
}

#[derive(Serialize)]
struct PrescriptionView<'a> {
    clinic_name: &'a str,
    date: &'a str,
    patient_name: &'a str,
    age: i32,
    phone: &'a str,
    uid: &'a str,
    doctor_name: &'a str,
    specialization: &'a str,
    qualification: &'a str,
    diagnosis: &'a str,
    prescription: &'a str,
    notes: Option<&'a str>,
}

/// `body` is already escaped markup and is inserted raw.
#[derive(Serialize)]
struct PrintPageView<'a> {
    title: &'a str,
    body: &'a str,
}

fn render<T: Serialize>(template: &str, data: &T) -> Result<String, RenderError> {
    Handlebars::new().render_template(template, data)
}

/// Record fields with their fallbacks applied. Empty strings count as absent.
struct Fields<'a> {
    doctor_name: &'a str,
    specialization: &'a str,
    qualification: &'a str,
    diagnosis: &'a str,
    prescription: &'a str,
    notes: Option<&'a str>,
}

impl<'a> Fields<'a> {
    fn of(history: &'a MedicalHistory) -> Self {
        let doctor = history.doctor.as_ref();
        Self {
            doctor_name: present(doctor.map(|d| d.name.as_str())).unwrap_or(NOT_AVAILABLE),
            specialization: present(doctor.and_then(|d| d.specialization.as_deref())).unwrap_or(NOT_AVAILABLE),
            qualification: present(doctor.and_then(|d| d.qualification.as_deref())).unwrap_or(""),
            diagnosis: present(history.diagnosis.as_deref()).unwrap_or(NO_DIAGNOSIS),
            prescription: present(history.prescription.as_deref()).unwrap_or(NO_PRESCRIPTION),
            notes: present(history.notes.as_deref()),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

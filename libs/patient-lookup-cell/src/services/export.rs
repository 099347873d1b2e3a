use std::fs;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::LookupError;
use crate::models::{MedicalHistory, Patient};
use crate::services::document::DocumentGenerator;

/// Whether the host produced a print view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrintView {
    Opened,
    /// The host refused to create the surface. Not an error.
    Blocked,
}

/// Delivers rendered documents to the operator.
pub trait ExportSink: Send + Sync {
    /// Hands over `content` as a file named `filename`.
    fn download(&self, content: &str, filename: &str) -> Result<()>;

    /// Shows `markup` on a separate print-ready surface titled `title`.
    fn open_print_view(&self, markup: &str, title: &str) -> PrintView;
}

/// Writes downloads and print views into a local directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a download named `filename` lands. Path separators in the name
    /// are replaced, so free-text patient names stay inside the directory.
    pub fn download_path(&self, filename: &str) -> Result<PathBuf> {
        let name = file_safe(filename);
        if name.is_empty() || Path::new(&name).file_name() != Some(OsStr::new(&name)) {
            return Err(anyhow!("Refusing to write outside the export directory: {}", filename));
        }
        Ok(self.dir.join(name))
    }

    pub fn print_path(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{}.html", file_safe(title)))
    }

    fn write_print_view(&self, markup: &str, title: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.print_path(title);
        fs::write(&path, markup)?;
        Ok(path)
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect()
}

impl ExportSink for DirectorySink {
    fn download(&self, content: &str, filename: &str) -> Result<()> {
        let path = self.download_path(filename)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, content)?;
        info!("Saved download to {}", path.display());
        Ok(())
    }

    fn open_print_view(&self, markup: &str, title: &str) -> PrintView {
        match self.write_print_view(markup, title) {
            Ok(path) => {
                info!("Print view ready at {}", path.display());
                PrintView::Opened
            }
            Err(e) => {
                warn!("Could not create print view '{}': {}", title, e);
                PrintView::Blocked
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportKind {
    Download,
    PrintView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedDocument {
    pub kind: ExportKind,
    /// Filename for downloads, window title for print views.
    pub name: String,
    pub content: String,
}

impl IntoResponse for ExportedDocument {
    fn into_response(self) -> Response {
        match self.kind {
            ExportKind::Download => {
                let mut response = (
                    [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
                    self.content,
                )
                    .into_response();
                match HeaderValue::from_str(&content_disposition(&self.name)) {
                    Ok(value) => {
                        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
                    }
                    Err(e) => {
                        warn!("Unusable download name '{}': {}", self.name, e);
                        response.headers_mut().insert(
                            header::CONTENT_DISPOSITION,
                            HeaderValue::from_static("attachment"),
                        );
                    }
                }
                response
            }
            ExportKind::PrintView => axum::response::Html(self.content).into_response(),
        }
    }
}

/// RFC 6266 attachment header: an ASCII `filename` for old clients plus the
/// exact UTF-8 name in `filename*`.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect::<String>()
        .replace(['"', '\\'], "_");
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    )
}

/// Captures exports in memory. Used headless and by the HTTP handlers.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<ExportedDocument>>,
    block_print_views: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose host refuses every print view.
    pub fn blocking_print_views() -> Self {
        Self {
            block_print_views: true,
            ..Self::default()
        }
    }

    pub fn documents(&self) -> Vec<ExportedDocument> {
        self.lock().clone()
    }

    pub fn take_last(&self) -> Option<ExportedDocument> {
        self.lock().pop()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ExportedDocument>> {
        self.documents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn capture(&self, kind: ExportKind, name: &str, content: &str) {
        self.lock().push(ExportedDocument {
            kind,
            name: name.to_string(),
            content: content.to_string(),
        });
    }
}

impl ExportSink for MemorySink {
    fn download(&self, content: &str, filename: &str) -> Result<()> {
        self.capture(ExportKind::Download, filename, content);
        Ok(())
    }

    fn open_print_view(&self, markup: &str, title: &str) -> PrintView {
        if self.block_print_views {
            return PrintView::Blocked;
        }
        self.capture(ExportKind::PrintView, title, markup);
        PrintView::Opened
    }
}

/// Renders a clinical record and hands it to a sink.
#[derive(Debug, Clone)]
pub struct ExportService {
    generator: DocumentGenerator,
}

impl ExportService {
    pub fn new(generator: DocumentGenerator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &DocumentGenerator {
        &self.generator
    }

    /// Returns the filename the document was delivered under.
    pub fn download_record(
        &self,
        sink: &dyn ExportSink,
        history: &MedicalHistory,
        patient: &Patient,
    ) -> Result<String, LookupError> {
        let content = self.generator.render_text(history, patient);
        let filename = self.generator.download_filename(history, patient);

        sink.download(&content, &filename)
            .map_err(|e| LookupError::Export(e.to_string()))?;

        debug!("Exported medical record {} as {}", history.id, filename);
        Ok(filename)
    }

    /// A blocked print view is reported, not treated as a failure.
    pub fn print_record(
        &self,
        sink: &dyn ExportSink,
        history: &MedicalHistory,
        patient: &Patient,
    ) -> Result<PrintView, LookupError> {
        let title = self.generator.print_title(patient);
        let page = self
            .generator
            .render_printable(history, patient)
            .and_then(|body| self.generator.print_page(&body, &title))
            .map_err(|e| LookupError::Export(e.to_string()))?;

        let view = sink.open_print_view(&page, &title);
        if view == PrintView::Blocked {
            warn!("Print view for medical record {} was blocked by the host", history.id);
        }
        Ok(view)
    }
}

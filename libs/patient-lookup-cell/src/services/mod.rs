pub mod aggregator;
pub mod document;
pub mod export;
pub mod lookup;
pub mod resolver;
pub mod session;

pub use aggregator::RecordAggregator;
pub use document::DocumentGenerator;
pub use export::{DirectorySink, ExportKind, ExportService, ExportSink, ExportedDocument, MemorySink, PrintView};
pub use lookup::PatientLookupService;
pub use resolver::{SearchCriteria, SearchResolver, UID_PREFIX};
pub use session::{LookupSession, LookupState, SearchOutcome};

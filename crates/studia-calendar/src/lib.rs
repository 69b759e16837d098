//! ICS calendar export for course assignments.

pub mod error;
pub mod export;

pub use error::ExportError;
pub use export::{build_calendar, NO_ASSIGNMENTS_MESSAGE};

//! Calendar export error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// A due date did not match the strict `YYYY-MM-DDTHH:MM:SSZ` format.
    /// Fatal to the whole export, not skipped per event; unlike HTML
    /// sanitization this is a strict contract.
    #[error("malformed due date {value:?}: expected YYYY-MM-DDTHH:MM:SSZ")]
    MalformedDueDate { value: String },
}

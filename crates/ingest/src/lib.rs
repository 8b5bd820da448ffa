//! CSV ingestion for the lead portal
//!
//! Admin uploads arrive as raw CSV text with headers that vary across export
//! batches. Ingestion parses the text into a raw table and maps it onto the
//! canonical lead schema through a fixed alias table per field. The only
//! mandatory column is the phone-identifying one; its absence fails the whole
//! upload before anything is written.

pub mod csv;
pub mod mapping;

pub use csv::{parse_csv, RawTable};
pub use mapping::{map_to_canonical, MappedBatch, ALIAS_TABLE_VERSION};

use thiserror::Error;

/// Ingestion errors. All of these surface to the admin as actionable
/// messages; none of them leave partial state behind.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("CSV is empty (no header row)")]
    Empty,

    #[error("Malformed CSV at line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("No phone column found; accepted headers: {accepted}")]
    MissingPhoneColumn { accepted: String },
}

//! Lead store and claim protocol
//!
//! Durable lead storage over a shared, sheet-like backing table with
//! controlled concurrent access by representative sessions.
//!
//! ## Store abstraction
//!
//! The backing table is reached through the [`SheetClient`] trait
//! (`get_header`, `read_all`, `write_cell`, `append_row`); the concrete
//! remote spreadsheet binding is an external collaborator. [`InMemorySheet`]
//! is the in-process implementation used for development and tests.
//!
//! ## Claim exclusivity
//!
//! The backing table offers no transactions, so a bare read-check-write
//! claim would race: two reps could both read `picked=false` before either
//! writes. [`LeadStore`] closes that window by serializing the whole
//! read-check-write sequence through a per-phone async mutex, giving
//! at-most-one successful claim per phone for every caller that goes through
//! this layer.

pub mod sheet;
pub mod store;

pub use sheet::{InMemorySheet, SheetClient};
pub use store::{ClaimOutcome, LeadStore, StoredLead, UpsertSummary};

use thiserror::Error;

/// Store errors. Claim conflicts and misses are not errors; they are
/// [`ClaimOutcome`] values so callers can render a message without
/// special-casing control flow.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An incoming record had no usable phone key. Raised before any write.
    #[error("Batch contains a record without a phone key; nothing was written")]
    MissingPhone,

    /// The sheet header is missing a column the operation needs.
    #[error("Backing sheet is missing the '{0}' column")]
    SchemaMismatch(&'static str),

    /// Remote table failure. Not retried; the caller re-issues the operation.
    #[error("Backing table error: {0}")]
    Backend(String),
}

//! Core types for the lead portal
//!
//! This crate provides the foundational types used across all other crates:
//! - The canonical lead record and its derived intent fields
//! - The fixed backing-sheet schema (column names and order)
//! - Phone-number normalization (the lead identity key)

pub mod lead;
pub mod phone;
pub mod schema;

pub use lead::{IntentBand, IntentScore, Lead, LeadState, Ownership};
pub use phone::normalize_phone;
pub use schema::{column_index, header_row, SheetColumn, SHEET_COLUMNS};

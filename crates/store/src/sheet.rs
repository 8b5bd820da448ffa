//! Backing table abstraction
//!
//! Row and column indices are 1-based; row 1 is the header, so row 2 is the
//! first data row. Writes against distinct cells carry no ordering or
//! atomicity guarantee across calls.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::StoreError;

/// A shared, sheet-like backing table.
#[async_trait]
pub trait SheetClient: Send + Sync {
    /// The header row (row 1), empty if the sheet has never been written.
    async fn get_header(&self) -> Result<Vec<String>, StoreError>;

    /// Every row including the header. Always a fresh read; the store layers
    /// no cache on top so reads reflect the latest writes by any party.
    async fn read_all(&self) -> Result<Vec<Vec<String>>, StoreError>;

    /// Write a single cell. 1-based row and column.
    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError>;

    /// Append a row after the last non-empty row.
    async fn append_row(&self, values: Vec<String>) -> Result<(), StoreError>;
}

/// In-process sheet used for development and tests.
#[derive(Default)]
pub struct InMemorySheet {
    rows: RwLock<Vec<Vec<String>>>,
}

impl InMemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with explicit rows (header first), for tests.
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }
}

#[async_trait]
impl SheetClient for InMemorySheet {
    async fn get_header(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.rows.read().first().cloned().unwrap_or_default())
    }

    async fn read_all(&self) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self.rows.read().clone())
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        if row == 0 || col == 0 {
            return Err(StoreError::Backend(
                "cell indices are 1-based".to_string(),
            ));
        }
        let mut rows = self.rows.write();
        let row_vec = rows
            .get_mut(row - 1)
            .ok_or_else(|| StoreError::Backend(format!("row {} out of range", row)))?;
        if col > row_vec.len() {
            row_vec.resize(col, String::new());
        }
        row_vec[col - 1] = value.to_string();
        Ok(())
    }

    async fn append_row(&self, values: Vec<String>) -> Result<(), StoreError> {
        self.rows.write().push(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_sheet() {
        let sheet = InMemorySheet::new();
        assert!(sheet.get_header().await.unwrap().is_empty());
        assert!(sheet.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_and_write_cell() {
        let sheet = InMemorySheet::new();
        sheet
            .append_row(vec!["phone".to_string(), "name".to_string()])
            .await
            .unwrap();
        sheet
            .append_row(vec!["9876543210".to_string(), "Asha".to_string()])
            .await
            .unwrap();

        sheet.write_cell(2, 2, "Asha D").await.unwrap();
        let rows = sheet.read_all().await.unwrap();
        assert_eq!(rows[1][1], "Asha D");
    }

    #[tokio::test]
    async fn test_write_cell_extends_short_row() {
        let sheet = InMemorySheet::with_rows(vec![vec!["a".to_string()]]);
        sheet.write_cell(1, 3, "x").await.unwrap();
        let rows = sheet.read_all().await.unwrap();
        assert_eq!(rows[0], vec!["a", "", "x"]);
    }

    #[tokio::test]
    async fn test_write_cell_out_of_range() {
        let sheet = InMemorySheet::new();
        assert!(sheet.write_cell(5, 1, "x").await.is_err());
        assert!(sheet.write_cell(0, 1, "x").await.is_err());
    }
}

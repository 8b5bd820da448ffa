//! Minimal CSV parser
//!
//! Handles quoted fields, escaped quotes ("") inside quotes, commas and
//! newlines inside quoted fields, and CRLF line endings. Rows shorter than
//! the header are padded with empty strings; longer rows keep their extra
//! cells (the mapper ignores unknown columns anyway).

use crate::IngestError;

/// A parsed CSV: one header row plus data rows, all strings.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Position of a header after trim+lowercase comparison.
    pub fn header_index(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == needle)
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Parse CSV text into a raw table. The first record is the header row.
pub fn parse_csv(text: &str) -> Result<RawTable, IngestError> {
    let mut records = parse_records(text)?;

    // Drop fully-empty trailing records (a trailing newline produces one)
    while matches!(records.last(), Some(r) if r.iter().all(|c| c.trim().is_empty())) {
        records.pop();
    }

    if records.is_empty() {
        return Err(IngestError::Empty);
    }

    let headers = records.remove(0);
    let width = headers.len();
    for row in &mut records {
        while row.len() < width {
            row.push(String::new());
        }
    }

    tracing::debug!(columns = width, rows = records.len(), "Parsed CSV upload");

    Ok(RawTable {
        headers,
        rows: records,
    })
}

fn parse_records(text: &str) -> Result<Vec<Vec<String>>, IngestError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '\n' => {
                    field.push(c);
                    line += 1;
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                if field.is_empty() {
                    in_quotes = true;
                } else {
                    return Err(IngestError::Malformed {
                        line,
                        message: "quote inside unquoted field".to_string(),
                    });
                }
            }
            ',' => {
                record.push(std::mem::take(&mut field));
            }
            '\r' => {
                // Consumed as part of CRLF; a bare CR is ignored
            }
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(IngestError::Malformed {
            line,
            message: "unterminated quoted field".to_string(),
        });
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

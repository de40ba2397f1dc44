// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Line-delimited JSON record reader and writer.
//!
//! Input handles yield one record per line. Lines whose trimmed length is
//! two characters or fewer carry no record and are silently skipped; every
//! surviving line must decode as a JSON object of scalars and lists. The
//! terminal write mirrors the format back out, one record per line.

use std::io::{BufRead, Write};

use crate::errors::ExecutionError;
use crate::model::Row;

/// Parse every record from `reader`, in line order.
///
/// Decode failures carry the 1-based line number of the offending line.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Row>, ExecutionError> {
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.len() <= 2 {
            continue;
        }
        let row = serde_json::from_str(trimmed).map_err(|source| ExecutionError::Decode {
            line: index + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Serialize `rows` to `writer`, one JSON record per line, and flush.
pub fn write_records<W: Write>(writer: &mut W, rows: &[Row]) -> Result<(), ExecutionError> {
    for row in rows {
        let record =
            serde_json::to_string(row).map_err(|source| ExecutionError::Encode { source })?;
        writeln!(writer, "{record}")?;
    }
    writer.flush()?;
    Ok(())
}

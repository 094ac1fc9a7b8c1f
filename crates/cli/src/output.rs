use crate::error::CliError;
use client::{ColumnType, Row};
use serde_json::Value;
use std::io::Write;

/// Prints result rows as tab separated text or as one JSON array per line.
pub struct RowWriter<W: Write> {
    out: W,
    json: bool,
    written: usize,
}

impl<W: Write> RowWriter<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            written: 0,
        }
    }

    pub fn write_column_types(&mut self, columns: &[ColumnType]) -> Result<(), CliError> {
        let line = if self.json {
            serde_json::to_string(columns)?
        } else {
            columns
                .iter()
                .map(|c| format!("{} ({})", c.name, c.type_name))
                .collect::<Vec<_>>()
                .join("\t")
        };
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    pub fn write_row(&mut self, row: &Row) -> Result<(), CliError> {
        let line = format_row(row, self.json)?;
        writeln!(self.out, "{line}")?;
        self.written += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<usize, CliError> {
        self.out.flush()?;
        Ok(self.written)
    }
}

pub fn format_row(row: &Row, json: bool) -> Result<String, CliError> {
    if json {
        return Ok(serde_json::to_string(row)?);
    }

    Ok(row.iter().map(format_value).collect::<Vec<_>>().join("\t"))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! CSV import and export of metadata rows
//!
//! Files use the upper-case column names as their header row. Quoting
//! follows RFC 4180: fields containing a comma, quote or line break are
//! wrapped in double quotes and embedded quotes are doubled. A leading
//! UTF-8 byte order mark is ignored.
//!
//! Import is all-or-nothing: every row is checked (shape, validation,
//! foreign keys pointing at ACTIVE parents) before anything is written, and
//! a single bad row rejects the whole file. Imported rows always get a
//! fresh id and start ACTIVE; an `ID` or `DELETED` column is accepted and
//! ignored. Import never cascades.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error as ThisError;
use validator::Validate;

use crate::core::entity::{Entity, EntityKind, MetaEntity};
use crate::core::error::{ImportError, MetaError, MetaResult, RowError, ValidationError};
use crate::core::service::EntityService;

const IGNORED_COLUMNS: &[&str] = &["ID", "DELETED"];

/// Malformed CSV input
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum CsvError {
    #[error("the file is not valid UTF-8 (bad byte at offset {offset})")]
    InvalidEncoding { offset: usize },

    #[error("the file has no header row")]
    MissingHeader,

    #[error("quoted field opened on line {line} is never closed")]
    UnterminatedQuote { line: usize },

    #[error("header names column '{column}' more than once")]
    DuplicateColumn { column: String },

    #[error("column '{column}' is not a {kind} column")]
    UnknownColumn { kind: EntityKind, column: String },
}

impl From<CsvError> for MetaError {
    fn from(err: CsvError) -> Self {
        MetaError::Validation(ValidationError::FieldError {
            field: "csv".into(),
            message: err.to_string(),
        })
    }
}

/// One data record with the line it starts on (the header is line 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// A parsed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<CsvRow>,
}

/// Read an uploaded file as UTF-8 text
pub fn decode(bytes: &[u8]) -> Result<&str, CsvError> {
    std::str::from_utf8(bytes).map_err(|e| CsvError::InvalidEncoding {
        offset: e.valid_up_to(),
    })
}

/// Parse CSV text. Blank lines are skipped.
pub fn parse(input: &str) -> Result<CsvTable, CsvError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut records: Vec<CsvRow> = Vec::new();
    let mut cells: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut quote_line = 1;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
                quote_line = line;
            }
            ',' => {
                cells.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                cells.push(std::mem::take(&mut field));
                quoted = false;
                push_record(&mut records, std::mem::take(&mut cells), record_line);
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: quote_line });
    }
    if !field.is_empty() || !cells.is_empty() || quoted {
        cells.push(field);
        push_record(&mut records, cells, record_line);
    }

    let mut records = records.into_iter();
    let header = records
        .next()
        .ok_or(CsvError::MissingHeader)?
        .cells
        .into_iter()
        .map(|column| column.trim().to_uppercase())
        .collect();

    Ok(CsvTable {
        header,
        rows: records.collect(),
    })
}

fn push_record(records: &mut Vec<CsvRow>, cells: Vec<String>, line: usize) {
    let blank = cells.len() == 1 && cells[0].is_empty();
    if !blank {
        records.push(CsvRow { line, cells });
    }
}

/// Quote a value when it needs it
pub fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render a header and rows, CRLF-terminated
pub fn render<R: AsRef<[String]>>(header: &[&str], rows: impl IntoIterator<Item = R>) -> String {
    let mut out = header
        .iter()
        .map(|column| escape(column))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str("\r\n");

    for row in rows {
        let line = row
            .as_ref()
            .iter()
            .map(|value| escape(value))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push_str("\r\n");
    }
    out
}

/// Outcome of an accepted import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub kind: EntityKind,
    pub imported: usize,
    /// Ids assigned to the new rows, in file order
    pub ids: Vec<String>,
}

/// Every ACTIVE row of `T` as CSV
pub async fn export_csv<T: MetaEntity>(service: &EntityService<T>) -> MetaResult<String> {
    let rows = service.list_all().await?;
    let mut lines = Vec::with_capacity(rows.len());
    for row in &rows {
        let json = serde_json::to_value(row).map_err(|e| MetaError::Internal(e.to_string()))?;
        let cells: Vec<String> = T::CSV_COLUMNS
            .iter()
            .map(|column| cell_text(json.get(*column)))
            .collect();
        lines.push(cells);
    }

    tracing::debug!(kind = %T::KIND, rows = lines.len(), "exported csv");
    Ok(render(T::CSV_COLUMNS, lines))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Parse, check and insert a CSV file of `T` rows in one transaction
pub async fn import_csv<T: MetaEntity>(
    service: &EntityService<T>,
    input: &str,
) -> MetaResult<ImportSummary> {
    let table = parse(input)?;
    check_header::<T>(&table.header)?;

    let mut errors = Vec::new();
    let mut staged: Vec<(usize, T)> = Vec::new();
    for row in table.rows {
        match row_to_entity::<T>(&table.header, &row) {
            Ok(entity) => staged.push((row.line, entity)),
            Err(message) => errors.push(RowError {
                line: row.line,
                message,
            }),
        }
    }

    let mut tx = service.store().begin().await?;
    for (line, entity) in &staged {
        for relation in T::KIND.parent_relations() {
            let Some(parent_id) = entity.parent_id(relation) else {
                continue;
            };
            let parent = tx.load(relation.parent(), parent_id).await?;
            if !parent.is_some_and(|p| p.flag().is_active()) {
                errors.push(RowError {
                    line: *line,
                    message: format!(
                        "{} '{}' does not reference an active {}",
                        relation.foreign_key(),
                        parent_id,
                        relation.parent()
                    ),
                });
            }
        }
    }

    if !errors.is_empty() {
        errors.sort_by_key(|e| e.line);
        tracing::warn!(kind = %T::KIND, rejected = errors.len(), "csv import rejected");
        return Err(ImportError {
            kind: T::KIND,
            rows: errors,
        }
        .into());
    }

    let mut ids = Vec::with_capacity(staged.len());
    for (_, entity) in staged {
        ids.push(entity.id().to_string());
        tx.insert(entity.into_record()).await?;
    }
    tx.commit().await?;

    tracing::info!(kind = %T::KIND, imported = ids.len(), "csv import committed");
    Ok(ImportSummary {
        kind: T::KIND,
        imported: ids.len(),
        ids,
    })
}

fn check_header<T: MetaEntity>(header: &[String]) -> Result<(), CsvError> {
    for (i, column) in header.iter().enumerate() {
        if header[..i].contains(column) {
            return Err(CsvError::DuplicateColumn {
                column: column.clone(),
            });
        }
        let known = T::CSV_COLUMNS.contains(&column.as_str())
            || IGNORED_COLUMNS.contains(&column.as_str());
        if !known {
            return Err(CsvError::UnknownColumn {
                kind: T::KIND,
                column: column.clone(),
            });
        }
    }
    Ok(())
}

fn row_to_entity<T: MetaEntity>(header: &[String], row: &CsvRow) -> Result<T, String> {
    if row.cells.len() != header.len() {
        return Err(format!(
            "expected {} fields, found {}",
            header.len(),
            row.cells.len()
        ));
    }

    let mut fields = Map::new();
    for (column, cell) in header.iter().zip(&row.cells) {
        let cell = cell.trim();
        if cell.is_empty() || IGNORED_COLUMNS.contains(&column.as_str()) {
            continue;
        }
        fields.insert(column.clone(), Value::String(cell.to_string()));
    }

    let draft: T::Draft = serde_json::from_value(Value::Object(fields)).map_err(|e| e.to_string())?;
    draft
        .validate()
        .map_err(|e| ValidationError::from(e).to_string())?;
    Ok(T::from_draft(draft))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_fields() {
        let table = parse("NAME,LABEL\r\n\"a,b\",\"say \"\"hi\"\"\"\r\nplain,\"multi\nline\"\r\n").unwrap();
        assert_eq!(table.header, vec!["NAME", "LABEL"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells, vec!["a,b", "say \"hi\""]);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].cells, vec!["plain", "multi\nline"]);
        assert_eq!(table.rows[1].line, 3);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_bom() {
        let table = parse("\u{feff}name\n\nfirst\n\nsecond").unwrap();
        assert_eq!(table.header, vec!["NAME"]);
        let lines: Vec<usize> = table.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn test_parse_keeps_trailing_empty_cells() {
        let table = parse("NAME,LABEL\nx,\n").unwrap();
        assert_eq!(table.rows[0].cells, vec!["x", ""]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(""), Err(CsvError::MissingHeader));
        assert_eq!(
            parse("NAME\n\"open"),
            Err(CsvError::UnterminatedQuote { line: 2 })
        );
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert_eq!(decode(b"NAME\nx"), Ok("NAME\nx"));
        assert_eq!(
            decode(&[0x4e, 0xff, 0xfe]),
            Err(CsvError::InvalidEncoding { offset: 1 })
        );
    }

    #[test]
    fn test_render_escapes() {
        let out = render(&["ID", "NAME"], [vec!["1".to_string(), "a,\"b\"".to_string()]]);
        assert_eq!(out, "ID,NAME\r\n1,\"a,\"\"b\"\"\"\r\n");
    }

    #[test]
    fn test_render_output_parses_back() {
        let rows = vec![vec!["x\ny".to_string(), String::new()]];
        let table = parse(&render(&["NAME", "LABEL"], rows.clone())).unwrap();
        assert_eq!(table.rows[0].cells, rows[0]);
    }
}

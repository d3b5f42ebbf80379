use crate::cell::Cell;
use crate::error::{ReferenceError, Result};
use crate::sheet::Sheet;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::debug;
use std::io::Cursor;
use std::path::Path;

/// Extensions calamine can open.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// List the worksheet names of an uploaded workbook
///
/// # Arguments
/// * `bytes` - Raw content of an xlsx/xls/xlsb/ods file
///
/// # Returns
/// * `Result<Vec<String>>` - Sheet names in workbook order
pub fn sheet_names_from_bytes(bytes: &[u8]) -> Result<Vec<String>> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    Ok(workbook.sheet_names())
}

/// Load one worksheet of an uploaded workbook
///
/// When `sheet` is `None` the first worksheet is used.
///
/// # Arguments
/// * `bytes` - Raw content of an xlsx/xls/xlsb/ods file
/// * `sheet` - Name of the worksheet to read
///
/// # Returns
/// * `Result<Sheet>` - Header row and typed data rows, or an error
///
/// # Examples
/// ```no_run
/// use docket_refs::loader::load_sheet_from_bytes;
///
/// let bytes = std::fs::read("docket_log.xlsx").unwrap();
/// match load_sheet_from_bytes(&bytes, None) {
///     Ok(sheet) => println!("Loaded {} rows from {}", sheet.rows.len(), sheet.name),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn load_sheet_from_bytes(bytes: &[u8], sheet: Option<&str>) -> Result<Sheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| ReferenceError::SheetNotFound {
                name: wanted.to_string(),
                available: names.clone(),
            })?,
        None => names.first().cloned().ok_or(ReferenceError::EmptyWorkbook)?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    debug!(
        "read sheet '{}' ({} x {})",
        sheet_name,
        range.height(),
        range.width()
    );

    let grid: Vec<Vec<Cell>> = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Sheet::from_grid(&sheet_name, grid)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s.as_str()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::from_excel_serial(dt.as_f64()),
        // ISO strings go through the same text parser as any other date text
        Data::DateTimeIso(s) => Cell::text(s.as_str()),
        Data::DurationIso(s) => Cell::text(s.as_str()),
        Data::Error(e) => Cell::Error(format!("{:?}", e)),
    }
}

/// Load a docket log from CSV text
///
/// Quoted fields may contain commas, doubled quotes and line breaks.
pub fn from_csv_str(name: &str, content: &str) -> Result<Sheet> {
    let grid: Vec<Vec<Cell>> = parse_csv(content)?
        .into_iter()
        .map(|row| row.into_iter().map(Cell::text).collect())
        .collect();
    Sheet::from_grid(name, grid)
}

/// Load a docket log from a CSV file
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Sheet> {
    let path = filepath.as_ref();
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("csv");
    from_csv_str(name, &content)
}

// Parse CSV content into rows of fields
fn parse_csv(content: &str) -> Result<Vec<Vec<String>>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 0;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    // Double quote inside quoted field - add a single quote
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current_field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut current_field));
            }
            '\r' | '\n' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                row.push(std::mem::take(&mut current_field));
                rows.push(std::mem::take(&mut row));
            }
            _ => {
                if c == '\n' {
                    line += 1;
                }
                current_field.push(c);
            }
        }
    }

    if in_quotes {
        return Err(ReferenceError::Csv {
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }

    // Last line without a trailing newline
    if !current_field.is_empty() || !row.is_empty() {
        row.push(current_field);
        rows.push(row);
    }

    Ok(rows)
}

/// Detect file type and load the appropriate format
///
/// # Arguments
/// * `filepath` - Path to a CSV or spreadsheet file
/// * `sheet` - Worksheet to read; ignored for CSV
///
/// # Examples
/// ```no_run
/// use docket_refs::loader::load_sheet;
///
/// match load_sheet("docket_log.ods", Some("Sheet1")) {
///     Ok(sheet) => println!("Successfully loaded {}", sheet.name),
///     Err(e) => eprintln!("Error loading file: {}", e),
/// }
/// ```
pub fn load_sheet(filepath: impl AsRef<Path>, sheet: Option<&str>) -> Result<Sheet> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => from_csv(path),
        Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => {
            let bytes = std::fs::read(path)?;
            load_sheet_from_bytes(&bytes, sheet)
        }
        Some(ext) => Err(ReferenceError::UnsupportedFormat {
            extension: ext.to_string(),
        }),
        None => Err(ReferenceError::UnsupportedFormat {
            extension: String::new(),
        }),
    }
}

/// List worksheet names of a file on disk. A CSV file has a single sheet.
pub fn sheet_names(filepath: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => Ok(vec![from_csv(path)?.name]),
        Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => {
            sheet_names_from_bytes(&std::fs::read(path)?)
        }
        Some(ext) => Err(ReferenceError::UnsupportedFormat {
            extension: ext.to_string(),
        }),
        None => Err(ReferenceError::UnsupportedFormat {
            extension: String::new(),
        }),
    }
}

fn upload_is_csv(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Load an uploaded file, choosing the CSV or workbook reader by its name
pub fn load_upload(file_name: &str, bytes: &[u8], sheet: Option<&str>) -> Result<Sheet> {
    if upload_is_csv(file_name) {
        let name = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("csv");
        from_csv_str(name, &String::from_utf8_lossy(bytes))
    } else {
        load_sheet_from_bytes(bytes, sheet)
    }
}

/// Worksheet names of an uploaded file
pub fn upload_sheet_names(file_name: &str, bytes: &[u8]) -> Result<Vec<String>> {
    if upload_is_csv(file_name) {
        Ok(vec![load_upload(file_name, bytes, None)?.name])
    } else {
        sheet_names_from_bytes(bytes)
    }
}

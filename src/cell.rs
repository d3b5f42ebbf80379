use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single typed value read from a worksheet.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
    /// Spreadsheet error values such as `#N/A` or `#REF!`
    Error(String),
}

// Formats tried, in order, for dates stored as text.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    // two-digit years first, "%Y" would read "24" as year 24
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

impl Cell {
    /// Build a cell from raw text, mapping an empty string to `Cell::Empty`.
    ///
    /// Whitespace-only text is a value, not a missing cell.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    /// Convert an Excel/ODS serial day number (1899-12-30 epoch) into a date cell.
    pub fn from_excel_serial(serial: f64) -> Self {
        match excel_serial_to_datetime(serial) {
            Some(dt) => Cell::Date(dt),
            None => Cell::Error(format!("invalid date serial {}", serial)),
        }
    }

    /// Whether the cell holds a value at all.
    ///
    /// Empty cells, empty strings and spreadsheet errors count as missing,
    /// like an NA value. Whitespace-only text is present.
    pub fn is_present(&self) -> bool {
        match self {
            Cell::Empty | Cell::Error(_) => false,
            Cell::Text(s) => !s.is_empty(),
            Cell::Number(n) => !n.is_nan(),
            Cell::Bool(_) | Cell::Date(_) => true,
        }
    }

    /// Render the cell as an opaque identifier, e.g. a tracking number.
    ///
    /// Whole numbers lose their fractional part so `12345.0` reads `12345`.
    pub fn as_identifier(&self) -> Option<String> {
        if !self.is_present() {
            return None;
        }
        match self {
            Cell::Text(s) => Some(s.trim().to_string()),
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Cell::Date(dt) => Some(dt.date().format("%Y-%m-%d").to_string()),
            Cell::Empty | Cell::Error(_) => None,
        }
    }

    /// Raw text content, used for titles. Line breaks are kept.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) if self.is_present() => Some(s.clone()),
            _ => self.as_identifier(),
        }
    }

    /// Interpret the cell as a calendar date.
    ///
    /// Plain numbers are not dates; only cells typed as dates by the
    /// spreadsheet, or text in one of the known formats, qualify.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Date(dt) => Some(*dt),
            Cell::Text(s) => parse_date_text(s),
            _ => None,
        }
    }
}

/// Parse a textual date in one of the formats filing logs are exported with.
pub fn parse_date_text(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Convert a spreadsheet serial day number to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(Duration::try_days(days)?)?
        .checked_add_signed(Duration::try_seconds(seconds)?)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

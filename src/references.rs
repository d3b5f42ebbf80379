use crate::cell::Cell;
use crate::error::Result;
use crate::sheet::Sheet;
use crate::suffix::generate_suffixes;
use chrono::{Datelike, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Docket log page every reference links to; the proceeding code is appended.
pub const DOCKET_LOG_URL: &str = "https://efiling.energy.ca.gov/Lists/DocketLog.aspx?docketnumber=";

lazy_static! {
    // Real line breaks, plus the literal "\n" escape some exports contain.
    static ref LINE_BREAK_REGEX: Regex = Regex::new(r"\r\n|\r|\n|\\n").unwrap();
}

/// One row of a docket log, as read from the sheet.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct InputRecord {
    pub tracking_number: Cell,
    pub docketed_date: Cell,
    pub document_title: Cell,
}

impl InputRecord {
    /// Convenience constructor from text values.
    pub fn from_text(tracking_number: &str, docketed_date: &str, document_title: &str) -> Self {
        InputRecord {
            tracking_number: Cell::text(tracking_number),
            docketed_date: Cell::text(docketed_date),
            document_title: Cell::text(document_title),
        }
    }
}

/// User supplied parameters of a build.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct BuildConfig {
    /// Citation key prefix, e.g. "CEC"
    pub prefix: String,
    /// Full agency name, e.g. "California Energy Commission"
    pub agency_name: String,
    /// Proceeding code, e.g. "24-OPT-05"
    pub proceeding_code: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            prefix: "CEC".to_string(),
            agency_name: "California Energy Commission".to_string(),
            proceeding_code: "24-OPT-05".to_string(),
        }
    }
}

impl BuildConfig {
    /// Link shared by every reference of this proceeding.
    pub fn docket_url(&self) -> String {
        format!("{}{}", DOCKET_LOG_URL, self.proceeding_code)
    }
}

/// A formatted citation and the link that follows it.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Reference {
    pub citation_text: String,
    pub url: String,
}

// A record that survived filtering.
struct ValidRecord {
    tracking_number: String,
    docketed: NaiveDateTime,
    title: String,
}

impl ValidRecord {
    fn from_input(record: &InputRecord) -> Option<Self> {
        let tracking_number = record.tracking_number.as_identifier()?;
        let docketed = record.docketed_date.as_date()?;
        let title = record.document_title.as_text()?;
        Some(ValidRecord {
            tracking_number,
            docketed,
            title: normalize_title(&title),
        })
    }

    fn year(&self) -> i32 {
        self.docketed.year()
    }
}

/// Keep only the first line of a title, trimmed.
pub fn normalize_title(title: &str) -> String {
    LINE_BREAK_REGEX
        .split(title)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Render a date as "March 4, 2024".
pub fn format_docketed_date(date: &NaiveDateTime) -> String {
    format!("{} {}, {}", date.format("%B"), date.day(), date.year())
}

/// Turn docket log records into an ordered reference list.
///
/// Incomplete records are dropped, the rest are ordered by docketed date
/// (stable on ties) and each year's records get suffixes "a", "b", ... in
/// that order. Output stays grouped by year, oldest first.
///
/// # Examples
/// ```
/// use docket_refs::references::{build, BuildConfig, InputRecord};
///
/// let records = vec![InputRecord::from_text("123", "2024-03-04", "Test Filing")];
/// let refs = build(&records, &BuildConfig::default());
/// assert_eq!(
///     refs[0].citation_text,
///     "CEC 2024a – California Energy Commission (TN 123). Test Filing. Docketed March 4, 2024. Accessed online at:"
/// );
/// ```
pub fn build(records: &[InputRecord], config: &BuildConfig) -> Vec<Reference> {
    let mut valid: Vec<ValidRecord> = records.iter().filter_map(ValidRecord::from_input).collect();

    // sort_by is stable, so equal dates keep input order
    valid.sort_by(|a, b| {
        a.year()
            .cmp(&b.year())
            .then_with(|| a.docketed.cmp(&b.docketed))
    });

    let url = config.docket_url();
    let mut references = Vec::with_capacity(valid.len());

    for group in valid.chunk_by(|a, b| a.year() == b.year()) {
        let suffixes = generate_suffixes(group.len());
        for (record, suffix) in group.iter().zip(suffixes) {
            references.push(Reference {
                citation_text: format!(
                    "{} {}{} – {} (TN {}). {}. Docketed {}. Accessed online at:",
                    config.prefix,
                    record.year(),
                    suffix,
                    config.agency_name,
                    record.tracking_number,
                    record.title,
                    format_docketed_date(&record.docketed),
                ),
                url: url.clone(),
            });
        }
    }

    references
}

/// Resolve the docket columns of a sheet and build its references.
pub fn build_from_sheet(sheet: &Sheet, config: &BuildConfig) -> Result<Vec<Reference>> {
    let records = sheet.records()?;
    Ok(build(&records, config))
}

use crate::docx::{DocumentOptions, to_docx};
use crate::error::Result;
use crate::references::Reference;
use serde::{Deserialize, Serialize};

/// Output formats a reference list can be exported to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Word document with clickable links
    Docx,
    /// One reference per line, citation followed by its URL
    Text,
    /// Two columns: citation, url
    Csv,
    /// Excel workbook with hyperlinked URL cells
    Xlsx,
    /// JSON array of {citation_text, url}
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Text => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ExportFormat::Json => "application/json",
        }
    }
}

/// File name offered for download, e.g. "Corby BESS_References.docx"
pub fn download_file_name(project_name: &str, format: ExportFormat) -> String {
    let project = project_name.trim();
    let project = if project.is_empty() { "Docket" } else { project };
    format!("{}_References.{}", project, format.extension())
}

/// Render references in the requested format
///
/// Header options only apply to the .docx output.
pub fn export(
    references: &[Reference],
    format: ExportFormat,
    options: &DocumentOptions,
) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Docx => to_docx(references, options),
        ExportFormat::Text => Ok(to_text(references).into_bytes()),
        ExportFormat::Csv => Ok(to_csv(references).into_bytes()),
        ExportFormat::Xlsx => to_xlsx(references),
        ExportFormat::Json => serde_json::to_vec_pretty(references)
            .map_err(|e| crate::error::ReferenceError::Render(e.to_string())),
    }
}

/// Plain-text reference list, citation and URL on one line as in the document
pub fn to_text(references: &[Reference]) -> String {
    let mut text = String::new();
    for reference in references {
        text.push_str(&reference.citation_text);
        text.push(' ');
        text.push_str(&reference.url);
        text.push('\n');
    }
    text
}

/// Convert references to CSV format
///
/// Values containing commas, quotes or newlines are quoted, with inner quotes doubled.
///
/// # Examples
/// ```
/// use docket_refs::downloader::to_csv;
/// use docket_refs::references::Reference;
///
/// let refs = vec![Reference { citation_text: "A, B".into(), url: "u".into() }];
/// assert_eq!(to_csv(&refs), "citation,url\n\"A, B\",u\n");
/// ```
pub fn to_csv(references: &[Reference]) -> String {
    let mut csv_content = String::from("citation,url\n");
    for reference in references {
        csv_content.push_str(&csv_field(&reference.citation_text));
        csv_content.push(',');
        csv_content.push_str(&csv_field(&reference.url));
        csv_content.push('\n');
    }
    csv_content
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Convert references to XLSX format
///
/// Column A holds the citation, column B a clickable link.
pub fn to_xlsx(references: &[Reference]) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("References")?;
    worksheet.set_column_width(0, 100.0)?;
    worksheet.set_column_width(1, 70.0)?;

    worksheet.write_string_with_format(0, 0, "Citation", &bold)?;
    worksheet.write_string_with_format(0, 1, "URL", &bold)?;

    for (i, reference) in references.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &reference.citation_text)?;
        worksheet.write_url(row, 1, reference.url.as_str())?;
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

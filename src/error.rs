use thiserror::Error;

/// Errors that abort a whole reference build.
///
/// Row-level problems (missing cells, unparseable dates) never show up here;
/// those rows are filtered out by the builder instead.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// The sheet has no header matching one of the required columns.
    #[error("Missing required column '{column}' (found: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Sheet '{name}' not found (available: {})", .available.join(", "))]
    SheetNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    #[error("Sheet '{name}' is empty")]
    EmptySheet { name: String },

    #[error("Unsupported file extension: {extension}")]
    UnsupportedFormat { extension: String },

    /// Anything calamine reports while opening or reading a workbook.
    #[error("Could not load workbook: {0}")]
    Workbook(String),

    #[error("CSV error on line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("Could not render document: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for ReferenceError {
    fn from(err: calamine::Error) -> Self {
        ReferenceError::Workbook(err.to_string())
    }
}

impl From<zip::result::ZipError> for ReferenceError {
    fn from(err: zip::result::ZipError) -> Self {
        ReferenceError::Render(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReferenceError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ReferenceError::Render(err.to_string())
    }
}

/// Result type for loading, building and rendering references.
pub type Result<T> = std::result::Result<T, ReferenceError>;

/*!
# Docket Reference List Generator

Turns a docket log spreadsheet (tracking number, docketed date, document
title) into a reference list with year-suffixed citation keys such as
"CEC 2024a", "CEC 2024b", exported as a Word document with clickable links.

## Pipeline

```text
file bytes ──loader──▶ Sheet ──Sheet::records──▶ InputRecord*
InputRecord* + BuildConfig ──references::build──▶ Reference*
Reference* + DocumentOptions ──downloader::export──▶ .docx / .txt / .csv / .xlsx / .json
```

## Citation format

```text
{prefix} {year}{suffix} – {agency} (TN {tracking number}). {title}. Docketed {Month D, YYYY}. Accessed online at:
```

followed by a link to the proceeding's docket log. Records sharing a year
are ordered by docketed date and suffixed "a".."z", then "aa".."zz", and so on.

## Modules

- **suffix**: Year suffix sequence
- **references**: Filtering, ordering, suffix assignment and citation formatting
- **cell**: Typed cell values, presence checks and date parsing
- **sheet**: Header lookup and record extraction
- **loader**: CSV and workbook (xlsx, xls, xlsb, ods) input
- **docx**: Word document renderer
- **downloader**: Export formats and download names
- **app**: HTTP front end (`web` feature)
- **error**: Error type shared by all of the above
*/

pub mod cell;
pub mod docx;
pub mod downloader;
pub mod error;
pub mod loader;
pub mod references;
pub mod sheet;
pub mod suffix;

#[cfg(feature = "web")]
pub mod app;

pub use cell::Cell;
pub use docx::{DocumentOptions, to_docx};
pub use downloader::{ExportFormat, export};
pub use error::{ReferenceError, Result};
pub use references::{BuildConfig, InputRecord, Reference, build, build_from_sheet};
pub use sheet::Sheet;
pub use suffix::generate_suffixes;

use clap::{Parser, Subcommand, ValueEnum};
use docket_refs::docx::DocumentOptions;
use docket_refs::downloader::{ExportFormat, download_file_name, export};
use docket_refs::loader;
use docket_refs::references::{BuildConfig, build_from_sheet};
use log::info;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "docket-refs",
    about = "Generate a docket reference list from a filing log spreadsheet"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the worksheets of a workbook
    Sheets {
        /// Spreadsheet file (.xlsx, .xls, .xlsb, .ods or .csv)
        file: PathBuf,
    },
    /// Build the reference list
    Build {
        /// Spreadsheet file (.xlsx, .xls, .xlsb, .ods or .csv)
        file: PathBuf,
        /// Worksheet to read; defaults to the first one
        #[arg(long)]
        sheet: Option<String>,
        /// Global prefix, e.g. CEC, GA, Dudek
        #[arg(long, default_value = "CEC")]
        prefix: String,
        /// Full agency name
        #[arg(long, default_value = "California Energy Commission")]
        agency: String,
        /// Proceeding code, e.g. 24-OPT-05
        #[arg(long, default_value = "24-OPT-05")]
        proceeding: String,
        /// Used to name the output file
        #[arg(long, default_value = "Corby BESS")]
        project_name: String,
        /// Full project name; adds the docket title and headers to the document
        #[arg(long)]
        header_title: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Docx)]
        format: Format,
        /// Output path, or "-" for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the web front end
    #[cfg(feature = "web")]
    Serve {
        #[arg(long, env = "DOCKET_REFS_ADDR", default_value = "127.0.0.1:3000")]
        addr: String,
        /// Largest accepted upload, in megabytes
        #[arg(long, default_value_t = 25)]
        max_upload_mb: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Word document with clickable links
    Docx,
    /// One reference per line
    Text,
    Csv,
    Xlsx,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Docx => ExportFormat::Docx,
            Format::Text => ExportFormat::Text,
            Format::Csv => ExportFormat::Csv,
            Format::Xlsx => ExportFormat::Xlsx,
            Format::Json => ExportFormat::Json,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Sheets { file } => {
            for name in loader::sheet_names(&file)? {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Build {
            file,
            sheet,
            prefix,
            agency,
            proceeding,
            project_name,
            header_title,
            format,
            output,
        } => {
            let format = ExportFormat::from(format);
            let config = BuildConfig {
                prefix,
                agency_name: agency,
                proceeding_code: proceeding,
            };
            let sheet = loader::load_sheet(&file, sheet.as_deref())?;
            let references = build_from_sheet(&sheet, &config)?;
            info!(
                "built {} references from {} rows of '{}'",
                references.len(),
                sheet.rows.len(),
                sheet.name
            );

            let options = DocumentOptions::for_project(
                header_title.as_deref().unwrap_or(""),
                &config.agency_name,
                &config.proceeding_code,
            );
            let bytes = export(&references, format, &options)?;

            let output = output.or_else(|| match format {
                ExportFormat::Text | ExportFormat::Json => None,
                _ => Some(PathBuf::from(download_file_name(&project_name, format))),
            });
            match output {
                Some(path) if path.as_os_str() != "-" => {
                    std::fs::write(&path, &bytes)?;
                    info!("wrote {}", path.display());
                }
                _ => std::io::stdout().write_all(&bytes)?,
            }
            Ok(())
        }
        #[cfg(feature = "web")]
        Command::Serve {
            addr,
            max_upload_mb,
        } => {
            let config = docket_refs::app::AppConfig {
                addr,
                body_limit: max_upload_mb * 1024 * 1024,
            };
            tokio::runtime::Runtime::new()?.block_on(docket_refs::app::run(config))
        }
    }
}

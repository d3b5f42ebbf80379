use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use tokio::net::TcpListener;

use crate::docx::DocumentOptions;
use crate::downloader::{ExportFormat, download_file_name, export};
use crate::error::ReferenceError;
use crate::loader;
use crate::references::{BuildConfig, Reference, build_from_sheet};

/// Server settings, fixed for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub addr: String,
    /// Largest accepted upload, in bytes
    pub body_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            body_limit: 25 * 1024 * 1024,
        }
    }
}

#[derive(Serialize)]
struct SheetsResponse {
    status: String,
    sheets: Vec<String>,
}

#[derive(Serialize)]
struct PreviewResponse {
    status: String,
    references: Vec<Reference>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ReferenceError> for ApiError {
    fn from(err: ReferenceError) -> Self {
        let status = match &err {
            ReferenceError::Render(_) | ReferenceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("request failed ({}): {}", self.status, self.message);
        (
            self.status,
            Json(ErrorResponse {
                status: "error".to_string(),
                message: self.message,
            }),
        )
            .into_response()
    }
}

// Everything posted by the upload form
struct UploadForm {
    file_name: String,
    file: Vec<u8>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm {
            file_name: String::new(),
            file: Vec::new(),
            fields: HashMap::new(),
        };

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?
        {
            let name = field.name().unwrap_or("unknown").to_string();
            if name == "file" {
                form.file_name = field.file_name().unwrap_or_default().to_string();
                form.file = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Could not read upload: {}", e)))?
                    .to_vec();
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid field '{}': {}", name, e)))?;
                form.fields.insert(name, value);
            }
        }

        if form.file.is_empty() {
            return Err(ApiError::bad_request("No file data received"));
        }
        Ok(form)
    }

    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(|s| s.trim()).unwrap_or("")
    }

    fn sheet(&self) -> Option<&str> {
        Some(self.field("sheet")).filter(|s| !s.is_empty())
    }

    fn flag(&self, name: &str) -> bool {
        matches!(self.field(name), "on" | "true" | "1" | "yes")
    }

    fn build_config(&self) -> Result<BuildConfig, ApiError> {
        let config = BuildConfig {
            prefix: self.field("prefix").to_string(),
            agency_name: self.field("agency_name").to_string(),
            proceeding_code: self.field("proceeding").to_string(),
        };
        if config.prefix.is_empty()
            || config.agency_name.is_empty()
            || config.proceeding_code.is_empty()
        {
            return Err(ApiError::bad_request(
                "Prefix, agency name and proceeding code are required",
            ));
        }
        Ok(config)
    }

    fn references(&self, config: &BuildConfig) -> Result<Vec<Reference>, ApiError> {
        let sheet = loader::load_upload(&self.file_name, &self.file, self.sheet())?;
        let references = build_from_sheet(&sheet, config)?;
        info!(
            "built {} references from {} rows of '{}'",
            references.len(),
            sheet.rows.len(),
            sheet.name
        );
        Ok(references)
    }
}

/// Start the reference list web server
///
/// # Arguments
/// * `config` - Listen address and upload limit
pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(&config);

    let listener = TcpListener::bind(&config.addr).await?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes of the web front end
pub fn router(config: &AppConfig) -> Router {
    Router::new()
        .route("/", get(serve_landing))
        .route("/api/sheets", post(list_sheets))
        .route("/api/preview", post(preview_references))
        .route("/api/references", post(download_references))
        .layer(DefaultBodyLimit::max(config.body_limit))
}

async fn serve_landing() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn list_sheets(multipart: Multipart) -> Result<Json<SheetsResponse>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let sheets = loader::upload_sheet_names(&form.file_name, &form.file)?;
    Ok(Json(SheetsResponse {
        status: "ok".to_string(),
        sheets,
    }))
}

async fn preview_references(
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let config = form.build_config()?;
    let references = form.references(&config)?;
    Ok(Json(PreviewResponse {
        status: "ok".to_string(),
        references,
    }))
}

async fn download_references(
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let config = form.build_config()?;
    let references = form.references(&config)?;

    let options = if form.flag("add_header") {
        DocumentOptions::for_project(
            form.field("project_title"),
            &config.agency_name,
            &config.proceeding_code,
        )
    } else {
        DocumentOptions::default()
    };

    let format = ExportFormat::Docx;
    let bytes = export(&references, format, &options)?;
    let file_name = download_file_name(form.field("project_name"), format);

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
        ],
        bytes,
    )
        .into_response())
}

// ASCII fallback plus an RFC 5987 encoded name for non-ASCII project names
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "docket-boundary";
    const LOG_CSV: &str = "TN #,Docketed Date,Document Title\n\
                           254001,2024-06-01,June Filing\n\
                           254000,2024-01-01,January Filing\n";

    fn form(fields: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            file_name: "log.csv".to_string(),
            file: LOG_CSV.as_bytes().to_vec(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn multipart_body(file: &str, fields: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"log.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n{file}\r\n--{BOUNDARY}--\r\n"
        ));
        body
    }

    async fn post(uri: &str, body: String) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        router(&AppConfig::default()).oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_build_config_requires_every_field() {
        let complete = form(&[
            ("prefix", " GA "),
            ("agency_name", "Government Agency"),
            ("proceeding", "23-AFC-01"),
        ]);
        let config = complete.build_config().ok().unwrap();
        assert_eq!(config.prefix, "GA");
        assert_eq!(config.proceeding_code, "23-AFC-01");

        for blank in ["prefix", "agency_name", "proceeding"] {
            let fields: Vec<(&str, &str)> = [
                ("prefix", "GA"),
                ("agency_name", "Government Agency"),
                ("proceeding", "23-AFC-01"),
            ]
            .into_iter()
            .map(|(k, v)| if k == blank { (k, "  ") } else { (k, v) })
            .collect();
            let err = form(&fields).build_config().err().unwrap();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "blank {}", blank);
        }
    }

    #[test]
    fn test_flags_and_sheet_field() {
        assert!(form(&[("add_header", "on")]).flag("add_header"));
        assert!(form(&[("add_header", "true")]).flag("add_header"));
        assert!(!form(&[("add_header", "off")]).flag("add_header"));
        assert!(!form(&[]).flag("add_header"));

        assert_eq!(form(&[("sheet", " Log ")]).sheet(), Some("Log"));
        assert_eq!(form(&[("sheet", "")]).sheet(), None);
    }

    #[test]
    fn test_error_status_mapping() {
        let missing = ApiError::from(ReferenceError::MissingColumn {
            column: "TN #".to_string(),
            available: vec![],
        });
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);

        let workbook = ApiError::from(ReferenceError::Workbook("bad zip".to_string()));
        assert_eq!(workbook.status, StatusCode::BAD_REQUEST);

        let render = ApiError::from(ReferenceError::Render("zip failed".to_string()));
        assert_eq!(render.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_content_disposition_fallback() {
        assert_eq!(
            content_disposition("Corby BESS_References.docx"),
            "attachment; filename=\"Corby BESS_References.docx\"; \
             filename*=UTF-8''Corby%20BESS_References.docx"
        );
        let header = content_disposition("Café_References.docx");
        assert!(header.contains("filename=\"Caf__References.docx\""));
        assert!(header.contains("filename*=UTF-8''Caf%C3%A9_References.docx"));
    }

    #[tokio::test]
    async fn test_landing_page() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = router(&AppConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sheets_endpoint_for_csv() {
        let response = post("/api/sheets", multipart_body(LOG_CSV, &[])).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["sheets"][0], "log");
    }

    #[tokio::test]
    async fn test_preview_endpoint() {
        let fields = [
            ("prefix", "CEC"),
            ("agency_name", "California Energy Commission"),
            ("proceeding", "24-OPT-05"),
        ];
        let response = post("/api/preview", multipart_body(LOG_CSV, &fields)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        let references = json["references"].as_array().unwrap();
        assert_eq!(references.len(), 2);
        assert_eq!(
            references[0]["citation_text"],
            "CEC 2024a – California Energy Commission (TN 254000). January Filing. Docketed January 1, 2024. Accessed online at:"
        );
        assert_eq!(
            references[1]["url"],
            "https://efiling.energy.ca.gov/Lists/DocketLog.aspx?docketnumber=24-OPT-05"
        );
    }

    #[tokio::test]
    async fn test_preview_rejects_missing_column() {
        let fields = [
            ("prefix", "CEC"),
            ("agency_name", "California Energy Commission"),
            ("proceeding", "24-OPT-05"),
        ];
        let csv = "TN #,Document Title\n1,Title\n";
        let response = post("/api/preview", multipart_body(csv, &fields)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_body(response).await;
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().contains("Docketed Date"));
    }

    #[tokio::test]
    async fn test_download_endpoint_returns_docx() {
        let fields = [
            ("prefix", "CEC"),
            ("agency_name", "California Energy Commission"),
            ("proceeding", "24-OPT-05"),
            ("project_name", "Corby BESS"),
            ("add_header", "on"),
            ("project_title", "Corby Battery Energy Storage System Project"),
        ];
        let response = post("/api/references", multipart_body(LOG_CSV, &fields)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            ExportFormat::Docx.mime_type()
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("filename=\"Corby BESS_References.docx\""));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"), "docx is a zip package");
    }
}


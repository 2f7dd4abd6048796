use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::PathRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::config::DEFAULT_POSITION;
use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::models::resume::{allowed_file, FileType, NewResume, ResumeRecord};
use crate::resumes::upload::{persist, stored_filename};
use crate::state::AppState;

/// Multipart field carrying the uploaded document.
pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub candidate_name: String,
    pub position: String,
}

impl From<ResumeRecord> for UploadResponse {
    fn from(record: ResumeRecord) -> Self {
        Self {
            success: true,
            id: record.id,
            filename: record.filename,
            original_name: record.original_name,
            file_size: record.file_size,
            file_type: record.file_type,
            candidate_name: record.candidate_name,
            position: record.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeRecord>,
}

/// POST /upload
///
/// The file is written to disk before text extraction, so it stays there
/// when extraction or the insert fails.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|_| AppError::NoFilePart)?;
    let (original_name, data) = read_resume_part(&mut multipart).await?;

    if original_name.is_empty() {
        return Err(AppError::NoSelectedFile);
    }
    if !allowed_file(&original_name) {
        return Err(AppError::InvalidFileType);
    }
    let file_type = FileType::from_filename(&original_name).ok_or(AppError::InvalidFileType)?;

    let filename = stored_filename(&original_name, file_type);
    let (path, size) = persist(&state.config.upload_folder, &filename, &data).await?;

    let text = extract_text(&path, file_type).await?;
    let candidate_name = state.names.extract(&text);

    let record = state
        .store
        .insert(NewResume {
            filename,
            original_name,
            file_size: i64::try_from(size).unwrap_or(i64::MAX),
            file_type,
            candidate_name,
            position: DEFAULT_POSITION.to_string(),
            file_path: path.to_string_lossy().into_owned(),
            upload_date: chrono::Local::now().naive_local(),
        })
        .await?;

    info!(
        "Stored resume {} ({}, {} bytes) as {}",
        record.id, record.file_type, record.file_size, record.file_path
    );
    Ok(Json(record.into()))
}

/// GET /resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = state.store.list().await?;
    Ok(Json(ResumeListResponse { resumes }))
}

/// GET /resume/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ResumeRecord>, AppError> {
    let Path(id) = id.map_err(|_| AppError::ResumeNotFound)?;
    let record = state.store.get(id).await?.ok_or(AppError::ResumeNotFound)?;
    Ok(Json(record))
}

/// Returns the first `resume` part that carries a filename. Parts without a
/// filename are plain form fields and do not count as the file.
async fn read_resume_part(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok((file_name, data));
    }
    Err(AppError::NoFilePart)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadTooLarge
    } else {
        AppError::Upload(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request},
        Router,
    };
    use chrono::NaiveDateTime;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::fixtures::{docx_bytes, pdf_bytes};
    use crate::models::resume::UPLOAD_DATE_FORMAT;
    use crate::ner::{GazetteerModel, NameExtractor};
    use crate::resumes::store::memory::MemoryResumeStore;
    use crate::resumes::store::ResumeStore;
    use crate::routes::build_router;

    use super::*;

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";

    struct Harness {
        router: Router,
        store: Arc<MemoryResumeStore>,
        uploads: PathBuf,
        _root: TempDir,
    }

    fn harness_with(store: MemoryResumeStore, names: NameExtractor) -> Harness {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.upload_folder = uploads.clone();

        let store = Arc::new(store);
        let state = AppState {
            store: store.clone() as Arc<dyn ResumeStore>,
            names,
            config,
        };
        Harness {
            router: build_router(state),
            store,
            uploads,
            _root: root,
        }
    }

    fn name_model() -> NameExtractor {
        let model = GazetteerModel::from_json(
            r#"{"given_names": ["jane", "john"], "stop_words": ["resume"]}"#,
        )
        .unwrap();
        NameExtractor::new(Arc::new(model))
    }

    fn harness() -> Harness {
        harness_with(MemoryResumeStore::default(), name_model())
    }

    fn multipart_request(field: &str, filename: Option<&str>, data: &[u8]) -> Request<Body> {
        let disposition = match filename {
            Some(f) => format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{f}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            ),
            None => format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n"),
        };

        let mut body = format!("--{BOUNDARY}\r\n{disposition}").into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> Value {
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn upload_docx(h: &Harness, filename: &str, lines: &[&str]) -> Value {
        let data = docx_bytes(lines);
        send(&h.router, multipart_request("resume", Some(filename), &data)).await
    }

    #[tokio::test]
    async fn test_wrong_field_name_is_no_file_part() {
        let h = harness();
        let body = send(
            &h.router,
            multipart_request("document", Some("cv.pdf"), b"%PDF"),
        )
        .await;
        assert_eq!(body, serde_json::json!({ "error": "No file part" }));
    }

    #[tokio::test]
    async fn test_non_multipart_is_no_file_part() {
        let h = harness();
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let body = send(&h.router, request).await;
        assert_eq!(body["error"], "No file part");
    }

    #[tokio::test]
    async fn test_text_field_named_resume_is_no_file_part() {
        let h = harness();
        let body = send(&h.router, multipart_request("resume", None, b"cv.pdf")).await;
        assert_eq!(body["error"], "No file part");
    }

    #[tokio::test]
    async fn test_empty_filename_is_no_selected_file() {
        let h = harness();
        let body = send(&h.router, multipart_request("resume", Some(""), b"")).await;
        assert_eq!(body["error"], "No selected file");
    }

    #[tokio::test]
    async fn test_txt_is_invalid_file_type() {
        let h = harness();
        let body = send(
            &h.router,
            multipart_request("resume", Some("notes.txt"), b"Jane Doe"),
        )
        .await;
        assert_eq!(body, serde_json::json!({ "error": "Invalid file type" }));
        assert!(!h.uploads.exists());
    }

    #[tokio::test]
    async fn test_successful_docx_upload() {
        let h = harness();
        let data = docx_bytes(&["Resume", "Jane Doe", "Backend Engineer"]);
        let body = send(
            &h.router,
            multipart_request("resume", Some("Jane Doe CV.DOCX"), &data),
        )
        .await;

        assert_eq!(body["success"], true);
        assert_eq!(body["id"], 1);
        assert_eq!(body["filename"], "Jane_Doe_CV.DOCX");
        assert_eq!(body["original_name"], "Jane Doe CV.DOCX");
        assert_eq!(body["file_size"], data.len() as i64);
        assert_eq!(body["file_type"], "docx");
        assert_eq!(body["candidate_name"], "Jane Doe");
        assert_eq!(body["position"], "To be determined");
        assert!(body.get("file_path").is_none());

        let stored = h.uploads.join("Jane_Doe_CV.DOCX");
        assert_eq!(std::fs::read(stored).unwrap(), data);
        assert_eq!(h.store.len(), 1);
    }

    #[tokio::test]
    async fn test_successful_pdf_upload() {
        let h = harness();
        let data = pdf_bytes(&["Jane Doe", "Backend Engineer"]);
        let body = send(
            &h.router,
            multipart_request("resume", Some("Jane Doe CV.pdf"), &data),
        )
        .await;

        assert_eq!(body["success"], true);
        assert_eq!(body["filename"], "Jane_Doe_CV.pdf");
        assert_eq!(body["file_type"], "pdf");
        assert_eq!(body["file_size"], data.len() as i64);
        assert_eq!(body["candidate_name"], "Jane Doe");

        let stored = h.uploads.join("Jane_Doe_CV.pdf");
        assert_eq!(std::fs::read(stored).unwrap(), data);
        assert_eq!(h.store.len(), 1);
    }

    #[tokio::test]
    async fn test_name_not_found() {
        let h = harness();
        let body = upload_docx(&h, "cv.docx", &["Backend Engineer", "Berlin"]).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["candidate_name"], "Name not found");
    }

    #[tokio::test]
    async fn test_missing_model_still_stores_upload() {
        let h = harness_with(MemoryResumeStore::default(), NameExtractor::unavailable());
        let body = upload_docx(&h, "cv.docx", &["Jane Doe"]).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["candidate_name"], "Model not available");
        assert_eq!(h.store.len(), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_keeps_file_and_skips_insert() {
        let h = harness();
        let body = send(
            &h.router,
            multipart_request("resume", Some("broken.docx"), b"not a word document"),
        )
        .await;

        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Error extracting text: "), "{message}");
        assert!(h.uploads.join("broken.docx").exists());
        assert_eq!(h.store.len(), 0);
    }

    #[tokio::test]
    async fn test_database_failure_on_insert() {
        let h = harness_with(MemoryResumeStore::offline(), name_model());
        let body = upload_docx(&h, "cv.docx", &["Jane Doe"]).await;

        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Database error: "), "{message}");
        assert!(h.uploads.join("cv.docx").exists());
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let h = harness();
        let data = vec![b'a'; crate::config::MAX_UPLOAD_BYTES + 1];
        let body = send(&h.router, multipart_request("resume", Some("big.pdf"), &data)).await;
        assert_eq!(body["error"], "File exceeds the 10 MiB upload limit");
        assert_eq!(h.store.len(), 0);
    }

    #[tokio::test]
    async fn test_list_includes_uploaded_record() {
        let h = harness();
        let data = docx_bytes(&["John Smith"]);
        send(&h.router, multipart_request("resume", Some("john.docx"), &data)).await;

        let body = send(&h.router, get("/resumes")).await;
        let resumes = body["resumes"].as_array().unwrap();
        assert_eq!(resumes.len(), 1);

        let record = &resumes[0];
        assert_eq!(record["filename"], "john.docx");
        assert_eq!(record["file_type"], "docx");
        assert_eq!(record["file_size"], data.len() as i64);
        assert_eq!(record["candidate_name"], "John Smith");
        assert_eq!(
            record["file_path"],
            h.uploads.join("john.docx").to_string_lossy().into_owned()
        );

        let uploaded = NaiveDateTime::parse_from_str(
            record["upload_date"].as_str().unwrap(),
            UPLOAD_DATE_FORMAT,
        )
        .unwrap();
        let now = chrono::Local::now().naive_local();
        assert!((now - uploaded).num_seconds().abs() <= 5);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let h = harness();
        upload_docx(&h, "first.docx", &["Jane Doe"]).await;
        upload_docx(&h, "second.docx", &["John Roe"]).await;

        let body = send(&h.router, get("/resumes")).await;
        let names: Vec<&str> = body["resumes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["filename"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["second.docx", "first.docx"]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let h = harness();
        let body = send(&h.router, get("/resumes")).await;
        assert_eq!(body, serde_json::json!({ "resumes": [] }));
    }

    #[tokio::test]
    async fn test_list_database_error() {
        let h = harness_with(MemoryResumeStore::offline(), name_model());
        let body = send(&h.router, get("/resumes")).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Database error: "));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let h = harness();
        let uploaded = upload_docx(&h, "cv.docx", &["Jane Doe"]).await;
        let id = uploaded["id"].as_i64().unwrap();

        let body = send(&h.router, get(&format!("/resume/{id}"))).await;
        assert_eq!(body["id"], id);
        assert_eq!(body["filename"], "cv.docx");
        assert_eq!(body["candidate_name"], "Jane Doe");
        assert!(body["upload_date"].is_string());
        assert!(body.get("success").is_none());
    }

    #[tokio::test]
    async fn test_get_missing_id() {
        let h = harness();
        let body = send(&h.router, get("/resume/42")).await;
        assert_eq!(body, serde_json::json!({ "error": "Resume not found" }));
    }

    #[tokio::test]
    async fn test_get_non_numeric_id() {
        let h = harness();
        let body = send(&h.router, get("/resume/abc")).await;
        assert_eq!(body["error"], "Resume not found");
    }
}

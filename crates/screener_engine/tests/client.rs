use std::path::PathBuf;

use pretty_assertions::assert_eq;
use screener_engine::{
    BackendApi, BackendError, BackendSettings, DescriptionUpload, FetchJobError, HttpBackend,
    SubmitRequest,
};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .expect("client")
}

fn write_upload(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn submit_parses_an_accepted_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "job_id": 42,
                "total_resumes": 2,
                "is_existing_job": false,
                "duplicate_count": 1,
                "skipped_files": [{"filename": "dup.pdf", "reason": "duplicate content"}]
            }"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let request = SubmitRequest {
        description: DescriptionUpload::Files(vec![write_upload(&dir, "role.pdf", "jd text")]),
        resumes: vec![
            write_upload(&dir, "a.pdf", "resume a"),
            write_upload(&dir, "b.pdf", "resume b"),
        ],
    };

    let accepted = backend(&server).submit_batch(&request).await.expect("accepted");
    // Numeric ids come back as opaque strings.
    assert_eq!(accepted.job_id, "42");
    assert_eq!(accepted.total_resumes, 2);
    assert_eq!(accepted.duplicate_count, 1);
    assert_eq!(accepted.skipped_files[0].filename, "dup.pdf");
}

#[tokio::test]
async fn submit_tags_the_request_with_a_resolved_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(body_string_contains("existing_job_id"))
        .and(body_string_contains("Senior engineer wanted"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"job_id": "7", "total_resumes": 1, "is_existing_job": true}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let request = SubmitRequest {
        // No description file is re-uploaded; the stored content rides along
        // as plain text.
        description: DescriptionUpload::Stored {
            existing_job_id: Some("7".to_string()),
            filename: "role.pdf".to_string(),
            content: "Senior engineer wanted".to_string(),
        },
        resumes: vec![write_upload(&dir, "a.pdf", "resume a")],
    };

    let accepted = backend(&server).submit_batch(&request).await.expect("accepted");
    assert!(accepted.is_existing_job);
    assert_eq!(accepted.job_id, "7");
}

#[tokio::test]
async fn submit_surfaces_non_success_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let request = SubmitRequest {
        description: DescriptionUpload::Files(vec![write_upload(&dir, "role.pdf", "jd")]),
        resumes: vec![write_upload(&dir, "a.pdf", "resume")],
    };

    let err = backend(&server).submit_batch(&request).await.unwrap_err();
    assert_eq!(err, BackendError::Status(500));
}

#[tokio::test]
async fn fetch_job_parses_resume_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/42"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "resumes": [
                    {"id": 1, "filename": "a.pdf", "candidate_name": "Ada", "analysis": {"fit_score": 91, "bucket": "strong"}},
                    {"id": 2, "filename": "b.pdf", "analysis": null}
                ]
            }"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let detail = backend(&server).fetch_job("42").await.expect("detail");
    assert_eq!(detail.resumes.len(), 2);
    assert!(detail.resumes[0].is_analyzed());
    assert_eq!(detail.resumes[0].bucket(), Some("strong"));
    assert_eq!(detail.resumes[0].candidate_name.as_deref(), Some("Ada"));
    assert!(!detail.resumes[1].is_analyzed());
    assert_eq!(detail.resumes[1].bucket(), None);
}

#[tokio::test]
async fn fetch_job_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = backend(&server).fetch_job("missing").await.unwrap_err();
    assert_eq!(err, FetchJobError::NotFound);
}

#[tokio::test]
async fn fetch_job_treats_other_failures_as_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/42"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = backend(&server).fetch_job("42").await.unwrap_err();
    assert!(matches!(err, FetchJobError::Transport(_)));
}

#[tokio::test]
async fn jd_check_parses_a_match_with_its_job() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jd/check"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "exists": true,
                "message": "Existing job description found",
                "job": {"id": 7, "resume_count": 3},
                "jd_file": {
                    "filename": "role.pdf",
                    "file_type": "pdf",
                    "created_at": "2026-07-01T12:00:00Z",
                    "content": "Senior engineer wanted"
                }
            }"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_upload(&dir, "role.pdf", "jd text");

    let response = backend(&server)
        .check_job_description(&file)
        .await
        .expect("response");
    assert!(response.exists);
    assert_eq!(response.job.unwrap().id, "7");
    assert_eq!(response.jd_file.unwrap().content, "Senior engineer wanted");
}

#[tokio::test]
async fn jd_check_parses_a_no_match() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jd/check"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"exists": false, "message": "no match"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_upload(&dir, "role.pdf", "jd text");

    let response = backend(&server)
        .check_job_description(&file)
        .await
        .expect("response");
    assert!(!response.exists);
    assert!(response.job.is_none());
    assert!(response.jd_file.is_none());
}

#[tokio::test]
async fn duplicate_check_scopes_the_probe_to_one_job() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/resumes/check-duplicates"))
        .and(body_string_contains("job_id"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "total_files": 2,
                "unique_count": 1,
                "duplicate_count": 1,
                "duplicates": [{
                    "filename": "a.pdf",
                    "duplicate_of": {"resume_filename": "earlier.pdf", "job_id": 7, "candidate_name": "Ada"}
                }]
            }"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let files = vec![
        write_upload(&dir, "a.pdf", "resume a"),
        write_upload(&dir, "b.pdf", "resume b"),
    ];

    let report = backend(&server)
        .check_duplicates(&files, "7")
        .await
        .expect("report");
    assert_eq!(report.duplicate_count, 1);
    assert_eq!(report.duplicates[0].duplicate_of.as_ref().unwrap().job_id, "7");
}

#[tokio::test]
async fn duplicate_check_reports_transport_failures() {
    // Nothing listens on this port; the probe's caller fails open.
    let client = HttpBackend::new(BackendSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        connect_timeout: std::time::Duration::from_millis(200),
        request_timeout: std::time::Duration::from_millis(500),
        ..BackendSettings::default()
    })
    .expect("client");

    let dir = TempDir::new().unwrap();
    let files = vec![write_upload(&dir, "a.pdf", "resume a")];

    let err = client.check_duplicates(&files, "7").await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

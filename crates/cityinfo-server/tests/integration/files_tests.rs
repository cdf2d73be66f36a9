use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use cityinfo_server::files::{
    DOWNLOAD_ARTIFACT, INVALID_UPLOAD_MESSAGE, MAX_UPLOAD_BYTES, UPLOAD_SUCCESS_MESSAGE,
};
use cityinfo_server::routes::UPLOAD_BODY_LIMIT;

use crate::integration::common::{TestApp, body_bytes, body_json, setup_test_app};

const BOUNDARY: &str = "cityinfo-test-boundary";

/// One-part multipart body for the given field.
fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &TestApp, version: &str, body: Vec<u8>) -> axum::http::Response<Body> {
    app.router
        .clone()
        .oneshot(
            Request::post(format!("/api/{version}/files"))
                .header(header::AUTHORIZATION, app.bearer())
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn assert_rejected(app: &TestApp, body: Vec<u8>) {
    let response = upload(app, "v1", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], INVALID_UPLOAD_MESSAGE);
    assert!(app.uploaded_files().is_empty());
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_serves_artifact_with_pdf_type() {
    let app = setup_test_app();
    let contents = b"%PDF-1.4 slides".to_vec();
    std::fs::write(app.files_dir.path().join(DOWNLOAD_ARTIFACT), &contents).unwrap();

    let response = app.get("/api/v1/files/42").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(DOWNLOAD_ARTIFACT));

    assert_eq!(body_bytes(response).await, contents);
}

#[tokio::test]
async fn download_ignores_file_id() {
    let app = setup_test_app();
    std::fs::write(app.files_dir.path().join(DOWNLOAD_ARTIFACT), b"%PDF").unwrap();

    for uri in ["/api/v1/files/1", "/api/v1/files/anything"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn download_missing_artifact_returns_empty_404() {
    let app = setup_test_app();

    let response = app.get("/api/v1/files/1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn download_deprecated_version_is_served_and_flagged() {
    let app = setup_test_app();
    std::fs::write(app.files_dir.path().join(DOWNLOAD_ARTIFACT), b"%PDF").unwrap();

    let response = app.get("/api/v0.1/files/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("api-deprecated-versions").unwrap(),
        "0.1"
    );
    assert_eq!(
        response.headers().get("api-supported-versions").unwrap(),
        "1.0"
    );
}

#[tokio::test]
async fn download_unsupported_version_returns_400() {
    let app = setup_test_app();

    let response = app.get("/api/v2/files/1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_requires_token() {
    let app = setup_test_app();

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/api/v1/files/1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_stores_pdf_under_generated_name() {
    let app = setup_test_app();
    let data = b"%PDF-1.7 uploaded".to_vec();

    let response = upload(
        &app,
        "v1",
        multipart_body("file", "../../etc/evil.pdf", "application/pdf", &data),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    assert_eq!(body_bytes(response).await, UPLOAD_SUCCESS_MESSAGE.as_bytes());

    let files = app.uploaded_files();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("uploaded_file_"));
    assert!(files[0].ends_with(".pdf"));
    assert_ne!(files[0], "evil.pdf");

    let stored = std::fs::read(app.upload_dir.path().join(&files[0])).unwrap();
    assert_eq!(stored, data);
}

#[tokio::test]
async fn repeated_uploads_do_not_collide() {
    let app = setup_test_app();

    for _ in 0..2 {
        let response = upload(
            &app,
            "v1",
            multipart_body("file", "same.pdf", "application/pdf", b"%PDF"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.uploaded_files().len(), 2);
}

#[tokio::test]
async fn upload_rejects_empty_file() {
    let app = setup_test_app();
    assert_rejected(&app, multipart_body("file", "empty.pdf", "application/pdf", b"")).await;
}

#[tokio::test]
async fn upload_rejects_non_pdf() {
    let app = setup_test_app();
    assert_rejected(&app, multipart_body("file", "notes.txt", "text/plain", b"hello")).await;
}

#[tokio::test]
async fn upload_rejects_missing_file_field() {
    let app = setup_test_app();
    assert_rejected(
        &app,
        multipart_body("attachment", "doc.pdf", "application/pdf", b"%PDF"),
    )
    .await;
}

#[tokio::test]
async fn upload_rejects_oversized_file() {
    let app = setup_test_app();
    let data = vec![b'a'; MAX_UPLOAD_BYTES + 1];
    assert_rejected(&app, multipart_body("file", "big.pdf", "application/pdf", &data)).await;
}

#[tokio::test]
async fn upload_over_body_limit_with_content_length_returns_400() {
    let app = setup_test_app();
    let data = vec![b'a'; MAX_UPLOAD_BYTES + 200 * 1024];
    let body = multipart_body("file", "huge.pdf", "application/pdf", &data);
    assert!(body.len() > UPLOAD_BODY_LIMIT);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::post("/api/v1/files")
                .header(header::AUTHORIZATION, app.bearer())
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .header(header::CONTENT_LENGTH, body.len())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], INVALID_UPLOAD_MESSAGE);
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn upload_accepts_file_at_size_limit() {
    let app = setup_test_app();
    let data = vec![b'a'; MAX_UPLOAD_BYTES];

    let response = upload(
        &app,
        "v1",
        multipart_body("file", "limit.pdf", "application/pdf", &data),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.uploaded_files().len(), 1);
}

#[tokio::test]
async fn upload_unsupported_version_returns_400() {
    let app = setup_test_app();

    let response = upload(
        &app,
        "v2",
        multipart_body("file", "doc.pdf", "application/pdf", b"%PDF"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.uploaded_files().is_empty());
}

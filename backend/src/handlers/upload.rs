//! File upload handlers

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::services::upload::{StoredFile, UploadDestination};
use crate::AppState;
use shared::validation::UploadError;

/// Accept the multipart `file` field for one destination
pub async fn upload_file(
    dest: &'static UploadDestination,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<StoredFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(dest, e))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        // Reject by name and type before buffering the body
        dest.rule.check_file(&file_name, content_type.as_deref())?;

        let bytes = field.bytes().await.map_err(|e| multipart_error(dest, e))?;
        let stored = state
            .uploads
            .store(&dest.rule, &file_name, content_type.as_deref(), &bytes)
            .await?;
        return Ok(Json(stored));
    }

    Err(UploadError::MissingFile.into())
}

fn multipart_error(dest: &UploadDestination, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge {
            max_mb: dest.rule.max_size_mb,
        }
        .into()
    } else {
        AppError::ValidationError(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use sqlx::PgPool;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::routes;
    use crate::AppState;

    const BOUNDARY: &str = "msme-test-boundary";

    fn app(upload_dir: &std::path::Path) -> Router {
        let config = Config::for_tests(&upload_dir.to_string_lossy());
        let db = PgPool::connect_lazy(&config.database.url).unwrap();
        let state = AppState::new(db, config).unwrap();
        routes::api_routes(state.clone()).with_state(state)
    }

    fn temp_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("msme-upload-handler-{}", Uuid::new_v4()))
    }

    fn multipart_request(path: &str, field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                field, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn public_image_upload_is_stored() {
        let dir = temp_dir();
        let response = app(&dir)
            .oneshot(multipart_request("/uploads/business-image", "file", "shop.PNG", "image/png", b"\x89PNG data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let file_path = json["file_path"].as_str().unwrap();
        assert!(file_path.starts_with("businessImage/"));
        assert!(file_path.ends_with(".png"));
        assert!(dir.join(file_path).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn wrong_kind_is_rejected() {
        let dir = temp_dir();
        let response = app(&dir)
            .oneshot(multipart_request("/uploads/business-image", "file", "profile.pdf", "application/pdf", b"%PDF"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!dir.join("businessImage").exists());
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let dir = temp_dir();
        let response = app(&dir)
            .oneshot(multipart_request("/uploads/business-profile", "document", "a.pdf", "application/pdf", b"%PDF"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_destination_requires_token() {
        let dir = temp_dir();
        let response = app(&dir)
            .oneshot(multipart_request("/uploads/blog-image", "file", "post.jpg", "image/jpeg", b"jpeg"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

//! HTTP handlers for the shell.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::page::{self, InputMode, Outcome};
use super::server::AppState;
use crate::error::{Result, TextgraphError};
use crate::generate;
use crate::render::Artifact;

const GENERIC_FAILURE: &str = "Failed to generate the knowledge graph.";

#[derive(Deserialize)]
pub struct TextForm {
    #[serde(default)]
    text: String,
}

/// GET / - Empty form page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(InputMode::UploadText, &Outcome::Empty, state.display_height))
}

/// POST /generate/text - Extract from pasted text
pub async fn generate_from_text(
    State(state): State<AppState>,
    Form(form): Form<TextForm>,
) -> Response {
    let result = generate::from_text(state.extractor.as_ref(), &state.renderer, &form.text).await;
    respond(
        &state,
        InputMode::PasteText,
        result,
        "Knowledge graph generated successfully!",
    )
}

/// POST /generate/upload - Extract from an uploaded .txt file
pub async fn generate_from_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let result = match read_file_field(multipart).await {
        Ok(bytes) => match generate::decode_text(&bytes) {
            Ok(text) => generate::from_text(state.extractor.as_ref(), &state.renderer, text).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    respond(
        &state,
        InputMode::UploadText,
        result,
        "Knowledge graph generated successfully!",
    )
}

/// POST /generate/triples - Render an uploaded JSON triple list
pub async fn generate_from_triples(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let result = match read_file_field(multipart).await {
        Ok(bytes) => match generate::decode_text(&bytes) {
            Ok(content) => generate::from_triples(&state.renderer, content).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    respond(
        &state,
        InputMode::UploadTriples,
        result,
        "Knowledge graph generated successfully from triples!",
    )
}

/// GET /artifacts/:id - Serve a rendered graph
pub async fn artifact(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    // Only ids we could have generated map onto files
    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => return (StatusCode::NOT_FOUND, "Unknown artifact").into_response(),
    };

    match tokio::fs::read_to_string(state.renderer.artifact_path(&id)).await {
        Ok(html) => (
            [(header::CACHE_CONTROL, "no-store")],
            Html(html),
        )
            .into_response(),
        Err(e) => {
            log::debug!("Artifact {} not readable: {}", id, e);
            (StatusCode::NOT_FOUND, "Unknown artifact").into_response()
        }
    }
}

/// GET /health - Health check endpoint
pub async fn health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "textgraph",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}

/// Pull the `file` field out of a multipart form.
async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TextgraphError::InvalidInput(format!("Malformed upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.map_err(|e| {
                TextgraphError::InvalidInput(format!("Failed to read upload: {}", e))
            })?;
            return Ok(bytes.to_vec());
        }
    }

    Err(TextgraphError::InvalidInput("No file was uploaded".to_string()))
}

fn respond(state: &AppState, mode: InputMode, result: Result<Artifact>, success: &str) -> Response {
    let (status, outcome) = match result {
        Ok(artifact) => {
            log::info!(
                "Generated artifact {} ({} nodes, {} edges)",
                artifact.id,
                artifact.node_count,
                artifact.edge_count
            );
            (
                StatusCode::OK,
                Outcome::Success {
                    message: success.to_string(),
                    artifact_id: artifact.id,
                },
            )
        }
        Err(e) => {
            let status = failure_status(&e);
            let message = match &e {
                TextgraphError::InvalidInput(msg) => msg.clone(),
                _ => GENERIC_FAILURE.to_string(),
            };
            if e.is_invalid_input() {
                log::warn!("Rejected input: {}", e);
            } else {
                log::error!("Generation failed: {}", e);
            }
            (status, Outcome::Failure { message })
        }
    };

    (status, Html(page::render(mode, &outcome, state.display_height))).into_response()
}

fn failure_status(err: &TextgraphError) -> StatusCode {
    match err {
        TextgraphError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TextgraphError::Extraction(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RenderConfig};
    use crate::generate::testing::{FailingExtractor, StaticExtractor};
    use crate::render::Renderer;
    use crate::web::ShellServer;
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "textgraph-test-boundary";

    fn app(dir: &TempDir, extractor: Arc<dyn crate::extract::Extractor>) -> Router {
        let renderer = Renderer::new(RenderConfig {
            output_dir: dir.path().to_path_buf(),
            ..RenderConfig::default()
        });
        ShellServer::new(extractor, renderer, &Config::default()).create_router()
    }

    fn multipart_request(uri: &str, filename: &str, content: &str) -> Request<Body> {
        let body = format!(
            concat!(
                "--{b}\r\n",
                "Content-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n",
                "Content-Type: application/octet-stream\r\n\r\n",
                "{c}\r\n--{b}--\r\n"
            ),
            b = BOUNDARY,
            f = filename,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn artifact_link(page: &str) -> String {
        let start = page.find("/artifacts/").expect("page links an artifact");
        page[start..start + "/artifacts/".len() + 36].to_string()
    }

    #[tokio::test]
    async fn test_index_page() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, Arc::new(StaticExtractor::curie()))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_string(response).await;
        assert!(page.contains("Upload triples (JSON)"));
    }

    #[tokio::test]
    async fn test_triples_upload_success_and_artifact_served() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, Arc::new(StaticExtractor::curie()));

        let response = app
            .clone()
            .oneshot(multipart_request(
                "/generate/triples",
                "triples.json",
                r#"[{"subject":"A","relation":"likes","object":"B"}]"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_string(response).await;
        assert!(page.contains("Knowledge graph generated successfully from triples!"));
        assert!(page.contains("height=\"1000\""));

        let response = app
            .oneshot(
                Request::builder()
                    .uri(artifact_link(&page))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("\"likes\""));
    }

    #[tokio::test]
    async fn test_triples_upload_missing_key_rejected() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, Arc::new(StaticExtractor::curie()))
            .oneshot(multipart_request(
                "/generate/triples",
                "triples.json",
                r#"[{"subject":"A","relation":"likes"}]"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let page = body_string(response).await;
        assert!(page.contains("Invalid JSON format"));
        assert!(!page.contains("<iframe"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_text_form_success() {
        let dir = TempDir::new().unwrap();
        let extractor = Arc::new(StaticExtractor::curie());
        let response = app(&dir, extractor.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/generate/text")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("text=Marie+Curie+worked+in+Paris"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Knowledge graph generated successfully!"));
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_txt_upload_success() {
        let dir = TempDir::new().unwrap();
        let extractor = Arc::new(StaticExtractor::curie());
        let response = app(&dir, extractor.clone())
            .oneshot(multipart_request(
                "/generate/upload",
                "notes.txt",
                "Marie Curie worked in Paris.",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_is_generic() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, Arc::new(FailingExtractor))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/generate/text")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("text=anything"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let page = body_string(response).await;
        assert!(page.contains(GENERIC_FAILURE));
        assert!(!page.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unknown_artifact() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, Arc::new(StaticExtractor::curie()));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/artifacts/../../etc/passwd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let uri = format!("/artifacts/{}", Uuid::new_v4());
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, Arc::new(FailingExtractor))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("\"status\":\"ok\""));
    }
}

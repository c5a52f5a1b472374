//! Integration tests for [`VeoApi`] against an in-process fake of the
//! Gemini REST endpoints.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::json;

use framecast_veo::messages::{InlineImage, PredictVideoRequest};
use framecast_veo::{VeoApi, VeoApiError, VeoConfig, VideoService};

const API_KEY: &str = "test-key";
const OPERATION: &str = "models/veo-2.0-generate-001/operations/op-42";

// ---------------------------------------------------------------------------
// Fake server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Option<String>,
    api_key_header: Option<String>,
    body: String,
}

#[derive(Clone)]
struct Fake {
    base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    fail_submit: bool,
}

async fn handle(
    State(fake): State<Fake>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    fake.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        api_key_header: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let path = uri.path();
    if method == Method::POST && path.ends_with(":predictLongRunning") {
        if fake.fail_submit {
            return (StatusCode::BAD_REQUEST, "image too large").into_response();
        }
        return axum::Json(json!({ "name": OPERATION })).into_response();
    }
    if method == Method::GET && path == format!("/v1beta/{OPERATION}") {
        return axum::Json(json!({
            "name": OPERATION,
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{
                        "video": { "uri": format!("{}/v1beta/files/vid-1:download?alt=media", fake.base) }
                    }]
                }
            }
        }))
        .into_response();
    }
    if method == Method::GET && path == "/v1beta/files/vid-1:download" {
        let authorised = uri
            .query()
            .is_some_and(|q| q.split('&').any(|kv| kv == format!("key={API_KEY}")));
        if !authorised {
            return (StatusCode::FORBIDDEN, "missing key").into_response();
        }
        return (StatusCode::OK, b"\x00\x00\x00\x18ftypmp42".to_vec()).into_response();
    }
    (StatusCode::NOT_FOUND, "unknown route").into_response()
}

async fn spawn_fake(fail_submit: bool) -> (VeoApi, Fake) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let base = format!("http://{addr}");

    let fake = Fake {
        base: base.clone(),
        requests: Arc::new(Mutex::new(Vec::new())),
        fail_submit,
    };
    let router = Router::new().fallback(handle).with_state(fake.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake server");
    });

    let mut config = VeoConfig::new(API_KEY);
    config.base_url = format!("{base}/v1beta");
    let api = VeoApi::new(config).expect("client should build");
    (api, fake)
}

fn request() -> PredictVideoRequest {
    PredictVideoRequest::image_to_video(
        "waves crashing",
        InlineImage {
            bytes_base64_encoded: "iVBORw0KGgo=".into(),
            mime_type: "image/png".into(),
        },
        1,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_posts_request_to_model_endpoint() {
    let (api, fake) = spawn_fake(false).await;

    let operation = api.submit(&request()).await.expect("submit should succeed");

    assert_eq!(operation.name, OPERATION);
    assert!(!operation.done);

    let recorded = fake.requests.lock().unwrap()[0].clone();
    assert_eq!(recorded.method, Method::POST);
    assert_eq!(
        recorded.path,
        "/v1beta/models/veo-2.0-generate-001:predictLongRunning"
    );
    assert_eq!(recorded.api_key_header.as_deref(), Some(API_KEY));

    let body: serde_json::Value = serde_json::from_str(&recorded.body).unwrap();
    assert_eq!(body["instances"][0]["prompt"], "waves crashing");
    assert_eq!(body["instances"][0]["image"]["mimeType"], "image/png");
    assert_eq!(body["parameters"]["sampleCount"], 1);
}

#[tokio::test]
async fn refresh_reads_operation_by_name() {
    let (api, fake) = spawn_fake(false).await;
    let pending = api.submit(&request()).await.unwrap();

    let finished = api.refresh(&pending).await.expect("poll should succeed");

    assert!(finished.done);
    let uri = finished.first_video_uri().expect("uri should be present");
    assert!(uri.ends_with("/v1beta/files/vid-1:download?alt=media"));

    let recorded = fake.requests.lock().unwrap()[1].clone();
    assert_eq!(recorded.method, Method::GET);
    assert_eq!(recorded.api_key_header.as_deref(), Some(API_KEY));
}

#[tokio::test]
async fn fetch_asset_appends_key_to_uri() {
    let (api, fake) = spawn_fake(false).await;
    let finished = api
        .refresh(&api.submit(&request()).await.unwrap())
        .await
        .unwrap();
    let uri = finished.first_video_uri().unwrap().to_string();

    let bytes = api.fetch_asset(&uri).await.expect("download should succeed");

    assert_eq!(bytes, b"\x00\x00\x00\x18ftypmp42");
    let recorded = fake.requests.lock().unwrap().last().cloned().unwrap();
    assert_eq!(recorded.query.as_deref(), Some("alt=media&key=test-key"));
}

#[tokio::test]
async fn non_success_status_becomes_api_error() {
    let (api, _fake) = spawn_fake(true).await;

    let err = api.submit(&request()).await.expect_err("submit should fail");

    assert_matches!(err, VeoApiError::ApiError { status: 400, ref body } if body == "image too large");
}

#[tokio::test]
async fn download_without_valid_key_is_rejected() {
    let (_api, fake) = spawn_fake(false).await;
    let mut config = VeoConfig::new("wrong-key");
    config.base_url = format!("{}/v1beta", fake.base);
    let api = VeoApi::new(config).unwrap();

    let err = api
        .fetch_asset(&format!("{}/v1beta/files/vid-1:download?alt=media", fake.base))
        .await
        .expect_err("download should be refused");

    assert_matches!(err, VeoApiError::ApiError { status: 403, .. });
}

#[tokio::test]
async fn unreachable_host_is_request_error() {
    let mut config = VeoConfig::new(API_KEY);
    // Port 9 (discard) is essentially never listening on loopback.
    config.base_url = "http://127.0.0.1:9/v1beta".into();
    let api = VeoApi::new(config).unwrap();

    let err = api.submit(&request()).await.expect_err("nothing listens");
    assert_matches!(err, VeoApiError::Request(_));
}

//! End-to-end tests of the HTTP API against a scripted completion service.

use api_lib::adapters::OpenAiCompletionAdapter;
use api_lib::config::Config;
use api_lib::web::{rest::api_doc, router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use qa_testgen_core::ports::{CompletionRequest, CompletionService, PortResult};
use qa_testgen_core::validation::MAX_IMAGE_BYTES;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const BOUNDARY: &str = "qa-testgen-boundary";
const REPLY: &str = "```json\n{\"testCases\":[{\"testCaseId\":\"TC001\",\"description\":\"d\",\"steps\":\"s\",\"expectedResult\":\"e\",\"priority\":\"High\",\"status\":\"Not Executed\"}]}\n```";

struct ScriptedCompletion {
    reply: String,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> PortResult<String> {
        self.seen.lock().unwrap().push(request);
        Ok(self.reply.clone())
    }
}

fn test_config() -> Arc<Config> {
    Arc::new(Config::from_lookup(|_| None).unwrap())
}

fn app_with(completion: Arc<dyn CompletionService>) -> Router {
    router(Arc::new(AppState::new(test_config(), completion)))
}

fn app_with_request_limit(completion: Arc<dyn CompletionService>, max_bytes: usize) -> Router {
    let limit = max_bytes.to_string();
    let config =
        Config::from_lookup(|key| (key == "MAX_REQUEST_BYTES").then(|| limit.clone())).unwrap();
    router(Arc::new(AppState::new(Arc::new(config), completion)))
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, Vec<u8>),
}

fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"upload\"\r\nContent-Type: {}\r\n\r\n",
                        name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn json_request(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn generate_returns_test_cases_and_history() {
    let completion = ScriptedCompletion::new(REPLY);
    let history = r#"[{"role":"user","content":"earlier"},{"role":"assistant","content":"reply"}]"#;
    let (status, body) = send(
        app_with(completion.clone()),
        multipart_request(
            "/api/generate",
            vec![
                Part::File("screenshot", "image/png", vec![0x89, b'P', b'N', b'G']),
                Part::Text("textInput", "Login form with remember-me"),
                Part::Text("chatHistory", history),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["testCases"][0]["testCaseId"], "TC001");
    assert_eq!(body["testCases"][0]["expectedResult"], "e");
    let chat = body["chatHistory"].as_array().unwrap();
    assert_eq!(chat.len(), 3);
    assert_eq!(chat[2], json!({"role": "assistant", "content": REPLY}));
    assert_eq!(completion.call_count(), 1);
}

#[tokio::test]
async fn generate_with_prose_reply_returns_fallback_record() {
    let (status, body) = send(
        app_with(ScriptedCompletion::new("No JSON here, sorry.")),
        multipart_request("/api/generate", vec![Part::Text("textInput", "Search page")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cases = body["testCases"].as_array().unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0]["id"], "1");
    assert_eq!(cases[0]["testCaseId"], "TC001");
    assert_eq!(cases[0]["priority"], "Medium");
    assert_eq!(cases[0]["status"], "Not Executed");
}

#[tokio::test]
async fn chat_appends_instruction_and_reply() {
    let completion = ScriptedCompletion::new(REPLY);
    let history = json!([{"role": "assistant", "content": "first reply"}]).to_string();
    let (status, body) = send(
        app_with(completion.clone()),
        multipart_request(
            "/api/chat",
            vec![
                Part::Text("textInput", "Login form"),
                Part::Text("chatHistory", &history),
                Part::Text("userMessage", "Add a lockout test"),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let chat = body["chatHistory"].as_array().unwrap();
    assert_eq!(chat.len(), 3);
    assert_eq!(chat[1], json!({"role": "user", "content": "Add a lockout test"}));
    assert_eq!(chat[2]["role"], "assistant");
}

#[tokio::test]
async fn chat_with_prose_reply_returns_no_test_cases() {
    let (status, body) = send(
        app_with(ScriptedCompletion::new("Happy to help!")),
        multipart_request("/api/chat", vec![Part::Text("userMessage", "More edge cases")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["testCases"], json!([]));
}

#[tokio::test]
async fn non_image_upload_is_rejected_before_calling_the_model() {
    for uri in ["/api/generate", "/api/chat"] {
        let completion = ScriptedCompletion::new(REPLY);
        let (status, body) = send(
            app_with(completion.clone()),
            multipart_request(
                uri,
                vec![
                    Part::File("screenshot", "application/pdf", b"%PDF-1.7".to_vec()),
                    Part::Text("textInput", "anything"),
                    Part::Text("userMessage", "anything"),
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILE_TYPE");
        assert_eq!(completion.call_count(), 0);
    }
}

#[tokio::test]
async fn oversize_upload_reports_its_size() {
    let completion = ScriptedCompletion::new(REPLY);
    let eleven_mib = vec![0u8; MAX_IMAGE_BYTES + 1024 * 1024];
    let (status, body) = send(
        app_with(completion.clone()),
        multipart_request(
            "/api/generate",
            vec![Part::File("screenshot", "image/jpeg", eleven_mib)],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "FILE_TOO_LARGE");
    assert!(body["error"].as_str().unwrap().contains("11.00MB"));
    assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn screenshot_beyond_request_limit_is_measured_and_rejected() {
    let completion = ScriptedCompletion::new(REPLY);
    let thirty_mib = vec![0u8; 30 * 1024 * 1024];
    let (status, body) = send(
        app_with(completion.clone()),
        multipart_request(
            "/api/generate",
            vec![Part::File("screenshot", "image/png", thirty_mib)],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "FILE_TOO_LARGE");
    assert!(body["error"].as_str().unwrap().contains("30.00MB"));
    assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn oversize_non_image_is_rejected_by_type() {
    let completion = ScriptedCompletion::new(REPLY);
    let big_pdf = vec![0u8; MAX_IMAGE_BYTES + 1];
    let (status, body) = send(
        app_with(completion.clone()),
        multipart_request(
            "/api/chat",
            vec![
                Part::File("screenshot", "application/pdf", big_pdf),
                Part::Text("userMessage", "anything"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FILE_TYPE");
    assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn text_parts_share_the_request_limit() {
    let completion = ScriptedCompletion::new(REPLY);
    let requirements = "x".repeat(600);
    let history = json!([{"role": "user", "content": requirements}]).to_string();
    let (status, body) = send(
        app_with_request_limit(completion.clone(), 1024),
        multipart_request(
            "/api/generate",
            vec![
                Part::Text("textInput", &requirements),
                Part::Text("chatHistory", &history),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "INVALID_REQUEST");
    assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn generate_without_input_is_rejected() {
    let (status, body) = send(
        app_with(ScriptedCompletion::new(REPLY)),
        multipart_request("/api/generate", vec![Part::Text("textInput", "")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NO_INPUT");
}

#[tokio::test]
async fn chat_without_message_is_rejected() {
    let (status, body) = send(
        app_with(ScriptedCompletion::new(REPLY)),
        multipart_request("/api/chat", vec![Part::Text("textInput", "Login form")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NO_INSTRUCTION");
}

#[tokio::test]
async fn malformed_history_is_rejected() {
    let (status, body) = send(
        app_with(ScriptedCompletion::new(REPLY)),
        multipart_request(
            "/api/generate",
            vec![
                Part::Text("textInput", "Login form"),
                Part::Text("chatHistory", "not json"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_HISTORY");
}

#[tokio::test]
async fn missing_credential_is_reported_as_misconfiguration() {
    let adapter = Arc::new(OpenAiCompletionAdapter::new(
        None,
        "https://api.groq.com/openai/v1",
        "llama-3.3-70b-versatile".to_string(),
    ));
    let (status, body) = send(
        app_with(adapter),
        multipart_request("/api/generate", vec![Part::Text("textInput", "Login form")]),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "SERVICE_MISCONFIGURED");
}

fn export_payload() -> Value {
    json!({
        "testCases": [{
            "id": "tc-1",
            "testCaseId": "TC001",
            "description": "Login, with \"quotes\"\nand lines",
            "steps": "1. Open\n2. Submit",
            "expectedResult": "Signed in",
            "priority": "high",
            "status": "Not Executed"
        }]
    })
}

#[tokio::test]
async fn csv_export_is_an_attachment() {
    let app = app_with(ScriptedCompletion::new(REPLY));
    let response = app
        .oneshot(json_request("/api/export/csv", &export_payload()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"test_cases.csv\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let mut reader = csv::Reader::from_reader(bytes.as_ref());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "Login, with \"quotes\"\nand lines");
}

#[tokio::test]
async fn xlsx_export_is_a_zip_document() {
    let app = app_with(ScriptedCompletion::new(REPLY));
    let response = app
        .oneshot(json_request("/api/export/xlsx", &export_payload()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"test_cases.xlsx\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn export_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/export/csv")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"testCases\": 5}"))
        .unwrap();
    let (status, body) = send(app_with(ScriptedCompletion::new(REPLY)), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app_with(ScriptedCompletion::new(REPLY)), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[test]
fn published_document_lists_every_route() {
    let doc = api_doc();
    assert_eq!(doc.info.title, "QA Test Case Generator API");
    assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));
    for path in [
        "/api/generate",
        "/api/chat",
        "/api/export/csv",
        "/api/export/xlsx",
        "/health",
    ] {
        assert!(doc.paths.paths.contains_key(path), "missing {}", path);
    }
}

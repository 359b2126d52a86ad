//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    form::{read_form, FormError},
    protocol::{
        from_conversation_log, ChatRole, ChatTurnDto, ErrorResponse, ExportRequest,
        HealthResponse, TestCaseDto, TestCasesResponse,
    },
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use qa_testgen_core::{
    domain::{GenerationRequest, RefinementRequest, TestCase, WorkflowOutput},
    ports::{PortError, TestCaseExporter},
    workflow::WorkflowError,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_handler,
        chat_handler,
        export_csv_handler,
        export_xlsx_handler,
        health_handler,
    ),
    components(
        schemas(
            TestCaseDto, ChatRole, ChatTurnDto, TestCasesResponse, ExportRequest,
            ErrorResponse, HealthResponse
        )
    ),
    tags(
        (name = "QA Test Case Generator API", description = "Generate, refine, and export QA test cases with an LLM.")
    )
)]
pub struct ApiDoc;

/// The published document: `ApiDoc` stamped with the service title and crate version.
pub fn api_doc() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "QA Test Case Generator API".to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc
}

//=========================================================================================
// Error Mapping
//=========================================================================================

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.to_string(),
        }),
    )
}

fn workflow_error(err: WorkflowError) -> HandlerError {
    let status = match &err {
        WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
        WorkflowError::Port(PortError::Misconfigured(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        WorkflowError::Port(PortError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        WorkflowError::Port(PortError::Service(_)) => StatusCode::BAD_GATEWAY,
        WorkflowError::Port(PortError::Unexpected(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Test case request failed: {}", err);
    } else {
        warn!("Rejected test case request: {}", err);
    }
    error_response(status, err.code(), err.to_string())
}

fn form_error(err: FormError) -> HandlerError {
    match err {
        FormError::Malformed { status, message } => {
            warn!("Malformed multipart request: {}", message);
            let status = if status.is_client_error() {
                status
            } else {
                StatusCode::BAD_REQUEST
            };
            error_response(
                status,
                "INVALID_REQUEST",
                format!("Failed to read multipart data: {}", message),
            )
        }
        FormError::Validation(err) => workflow_error(WorkflowError::Validation(err)),
    }
}

fn to_response(output: WorkflowOutput) -> Json<TestCasesResponse> {
    Json(TestCasesResponse {
        test_cases: output.test_cases.into_iter().map(TestCaseDto::from).collect(),
        chat_history: from_conversation_log(output.history),
    })
}

//=========================================================================================
// Generation and Refinement Handlers
//=========================================================================================

/// Generate a fresh set of test cases from a screenshot and/or requirements.
///
/// The returned `chatHistory` is the submitted history plus the model's raw reply.
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body(content_type = "multipart/form-data", description = "Parts: `screenshot` (optional image), `textInput`, `chatHistory` (JSON array)."),
    responses(
        (status = 200, description = "Test cases generated", body = TestCasesResponse),
        (status = 400, description = "Invalid input (INVALID_FILE_TYPE, FILE_TOO_LARGE, NO_INPUT, INVALID_HISTORY)", body = ErrorResponse),
        (status = 500, description = "Completion service misconfigured", body = ErrorResponse),
        (status = 502, description = "Completion service error", body = ErrorResponse),
        (status = 504, description = "Completion service timed out", body = ErrorResponse)
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TestCasesResponse>, HandlerError> {
    let form = read_form(multipart, app_state.config.max_request_bytes)
        .await
        .map_err(form_error)?;
    info!(
        "Generate request: screenshot={}, history={} turn(s).",
        form.screenshot.is_some(),
        form.chat_history.len()
    );

    let output = app_state
        .workflow
        .generate(GenerationRequest {
            image: form.screenshot,
            requirements: form.text_input,
            history: form.chat_history,
        })
        .await
        .map_err(workflow_error)?;

    Ok(to_response(output))
}

/// Refine the current test cases with a chat instruction.
///
/// The returned `chatHistory` is the submitted history plus the instruction and
/// the model's raw reply. An empty `testCases` list means the reply could not be
/// parsed and the client should keep its current table.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body(content_type = "multipart/form-data", description = "Parts: `screenshot` (optional image), `textInput`, `chatHistory` (JSON array), `userMessage`."),
    responses(
        (status = 200, description = "Test cases refined", body = TestCasesResponse),
        (status = 400, description = "Invalid input (INVALID_FILE_TYPE, FILE_TOO_LARGE, NO_INSTRUCTION, INVALID_HISTORY)", body = ErrorResponse),
        (status = 500, description = "Completion service misconfigured", body = ErrorResponse),
        (status = 502, description = "Completion service error", body = ErrorResponse),
        (status = 504, description = "Completion service timed out", body = ErrorResponse)
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TestCasesResponse>, HandlerError> {
    let form = read_form(multipart, app_state.config.max_request_bytes)
        .await
        .map_err(form_error)?;
    info!(
        "Chat request: screenshot={}, history={} turn(s).",
        form.screenshot.is_some(),
        form.chat_history.len()
    );

    let output = app_state
        .workflow
        .refine(RefinementRequest {
            image: form.screenshot,
            requirements: form.text_input,
            history: form.chat_history,
            instruction: form.user_message,
        })
        .await
        .map_err(workflow_error)?;

    Ok(to_response(output))
}

//=========================================================================================
// Export Handlers
//=========================================================================================

fn export_with(
    exporter: &dyn TestCaseExporter,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, HandlerError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected export request: {}", rejection.body_text());
        error_response(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
    })?;
    let test_cases: Vec<TestCase> = request.test_cases.into_iter().map(TestCase::from).collect();

    let bytes = exporter.encode(&test_cases).map_err(|e| {
        error!("Export to {} failed: {}", exporter.file_name(), e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED", e.to_string())
    })?;
    info!("Exported {} test case(s) to {}.", test_cases.len(), exporter.file_name());

    let headers = [
        (header::CONTENT_TYPE, exporter.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", exporter.file_name()),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// Download the test cases as `test_cases.csv`.
#[utoipa::path(
    post,
    path = "/api/export/csv",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "CSV document (`text/csv`), served as an attachment"),
        (status = 400, description = "Malformed request body", body = ErrorResponse)
    )
)]
pub async fn export_csv_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, HandlerError> {
    export_with(app_state.csv_exporter.as_ref(), payload)
}

/// Download the test cases as a styled `test_cases.xlsx` spreadsheet.
#[utoipa::path(
    post,
    path = "/api/export/xlsx",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "XLSX document, served as an attachment"),
        (status = 400, description = "Malformed request body", body = ErrorResponse)
    )
)]
pub async fn export_xlsx_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, HandlerError> {
    export_with(app_state.xlsx_exporter.as_ref(), payload)
}

//=========================================================================================
// Health
//=========================================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

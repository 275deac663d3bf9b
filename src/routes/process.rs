//! The request orchestrator behind `POST /api/process-epub`.
//!
//! One request moves through a fixed sequence: validate the upload, stage it
//! into the scratch directory, invoke the hyphenation tool, read the output
//! back, and answer. Whatever branch the request takes after staging began,
//! the allocated temp paths are released exactly once before the response is
//! produced.

use crate::config::ServerConfig;
use crate::error::{HyphenError, ServerResult};
use crate::response::ProcessingOutcome;
use crate::scratch::TempArtifactSet;
use crate::state::ServerState;
use crate::validate::validate;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// The two multipart fields a request carries. Transient; owned by the
/// orchestrator for the duration of one request.
#[derive(Debug, Default)]
struct UploadForm {
    file_name: Option<String>,
    file_bytes: Vec<u8>,
    language: Option<String>,
}

pub async fn process_epub(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let start = Instant::now();
    let outcome = run_pipeline(&state, multipart).await;
    let elapsed_ms = start.elapsed().as_millis();

    match &outcome {
        ProcessingOutcome::Success { bytes, file_name } => {
            info!(
                file_name = %file_name,
                output_bytes = bytes.len(),
                elapsed_ms,
                "process_success"
            );
        }
        ProcessingOutcome::Failure(err) => {
            warn!(kind = err.kind(), error = %err, elapsed_ms, "process_failure");
        }
    }

    outcome.into_response()
}

/// Received → Validated → Staged → Invoked → Finalized.
async fn run_pipeline(
    state: &ServerState,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProcessingOutcome {
    let form = match read_form(multipart, &state.config).await {
        Ok(form) => form,
        Err(err) => return ProcessingOutcome::Failure(err),
    };

    // Received → Validated. On failure nothing was staged, so there is
    // nothing to clean up.
    let upload = match validate(
        form.file_name.as_deref(),
        form.file_bytes.len() as u64,
        form.language.as_deref(),
        &state.config,
    ) {
        Ok(upload) => upload,
        Err(err) => return ProcessingOutcome::Failure(err),
    };

    // Validated → Staged → Invoked. The staged section runs as one fallible
    // block; release is awaited before its result is inspected, so cleanup
    // holds on every branch.
    let artifacts = TempArtifactSet::allocate(&state.scratch);
    let result = staged_section(state, &artifacts, &form.file_bytes, upload.language()).await;
    state.scratch.release(&artifacts).await;

    match result {
        Ok(bytes) => ProcessingOutcome::Success {
            bytes,
            file_name: upload.file_name().to_string(),
        },
        Err(err) => ProcessingOutcome::Failure(err),
    }
}

async fn staged_section(
    state: &ServerState,
    artifacts: &TempArtifactSet,
    upload_bytes: &[u8],
    language: &str,
) -> ServerResult<Vec<u8>> {
    state.scratch.stage(artifacts.input(), upload_bytes).await?;
    state
        .hyphenator
        .hyphenate(artifacts.input(), artifacts.output(), language)
        .await?;
    state.scratch.retrieve(artifacts.output()).await
}

/// Drain the multipart stream into the two fields the pipeline uses. A read
/// that trips the body limit is reported as the size rejection; any other
/// framing or read error is an internal fault. Either way the caller gets
/// the JSON error shape, never a framework page.
async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
    cfg: &ServerConfig,
) -> ServerResult<UploadForm> {
    let mut multipart = multipart.map_err(|e| HyphenError::Internal(e.to_string()))?;
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_read_error(e, cfg))?
    {
        match field.name() {
            Some("file") => {
                form.file_name = field.file_name().map(str::to_string);
                form.file_bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_read_error(e, cfg))?
                    .to_vec();
            }
            Some("language") => {
                form.language = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_read_error(e, cfg))?,
                );
            }
            _ => {}
        }
    }

    Ok(form)
}

/// An upload big enough to exhaust the body limit fails during the multipart
/// read, before the validator can see its size. That failure is still the
/// caller sending too much data, so it maps to the same rejection the
/// validator produces.
fn multipart_read_error(err: MultipartError, cfg: &ServerConfig) -> HyphenError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HyphenError::FileTooLarge {
            limit_mb: cfg.max_upload_size_mb,
        }
    } else {
        HyphenError::Internal(err.to_string())
    }
}

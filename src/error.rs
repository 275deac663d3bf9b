//! Error surface for the hyphenation pipeline.
//!
//! Every failure a request can hit is an enumerable kind with a fixed HTTP
//! status. Errors never escape the handler as anything other than the JSON
//! shape `{"error": "<message>", "success": false}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type ServerResult<T> = Result<T, HyphenError>;

/// Everything that can go wrong between receiving an upload and sending a
/// response. Validation kinds carry the user-facing message verbatim;
/// pipeline kinds carry the underlying detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HyphenError {
    /// No `file` field was present in the multipart form.
    #[error("No file provided")]
    MissingFile,

    /// The uploaded file name does not end in `.epub` (case-insensitive).
    #[error("Invalid file type. Only EPUB files are allowed")]
    InvalidFileType,

    /// The upload exceeds the configured size ceiling.
    #[error("File size must be less than {limit_mb}MB")]
    FileTooLarge { limit_mb: usize },

    /// The declared language is not in the supported set.
    ///
    /// `allowed` is preformatted from the configured set, e.g. `"en" or "ru"`.
    #[error("Invalid language. Must be {allowed}")]
    UnsupportedLanguage { allowed: String },

    /// Writing the upload into the scratch directory failed. Server-side:
    /// disk full, permissions, missing scratch dir.
    #[error("failed to stage upload: {0}")]
    StageWrite(String),

    /// The hyphenation tool could not be started or exited non-zero.
    /// The detail is the tool's stderr when it produced any.
    #[error("EPUB hyphenation failed: {0}")]
    Invocation(String),

    /// The hyphenation tool exceeded its deadline and was killed.
    #[error("EPUB hyphenation timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The tool exited zero but left no readable output file.
    #[error("hyphenation produced no readable output: {0}")]
    RetrieveRead(String),

    /// Catch-all for anything unanticipated (malformed multipart, etc).
    #[error("{0}")]
    Internal(String),
}

impl HyphenError {
    /// HTTP status this error surfaces as.
    ///
    /// Caller-correctable failures (bad input, malformed source document)
    /// are 400; server-side faults are 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HyphenError::MissingFile
            | HyphenError::InvalidFileType
            | HyphenError::FileTooLarge { .. }
            | HyphenError::UnsupportedLanguage { .. }
            | HyphenError::Invocation(_) => StatusCode::BAD_REQUEST,
            HyphenError::StageWrite(_)
            | HyphenError::Timeout { .. }
            | HyphenError::RetrieveRead(_)
            | HyphenError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable kind tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            HyphenError::MissingFile => "MISSING_FILE",
            HyphenError::InvalidFileType => "INVALID_FILE_TYPE",
            HyphenError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            HyphenError::UnsupportedLanguage { .. } => "UNSUPPORTED_LANGUAGE",
            HyphenError::StageWrite(_) => "STAGE_WRITE",
            HyphenError::Invocation(_) => "INVOCATION",
            HyphenError::Timeout { .. } => "TIMEOUT",
            HyphenError::RetrieveRead(_) => "RETRIEVE_READ",
            HyphenError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for HyphenError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "success": false,
        }));

        (status, body).into_response()
    }
}

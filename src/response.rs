//! Response construction.
//!
//! A request ends in exactly one of two shapes: a binary EPUB attachment, or
//! a JSON error object. The content type alone tells a caller which branch
//! it got; the shapes never mix.

use crate::error::HyphenError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// The terminal state of one request, produced once and consumed once.
#[derive(Debug)]
pub enum ProcessingOutcome {
    Success {
        /// Raw transformed bytes, returned unmodified.
        bytes: Vec<u8>,
        /// The original upload's file name; drives the attachment name.
        file_name: String,
    },
    Failure(HyphenError),
}

/// Attachment name for a transformed upload: the original name with its
/// extension stripped, plus a `-hyphenated.epub` suffix.
pub fn attachment_file_name(original: &str) -> String {
    let base = original
        .rsplit_once('.')
        .map(|(base, _ext)| base)
        .unwrap_or(original);
    format!("{base}-hyphenated.epub")
}

impl IntoResponse for ProcessingOutcome {
    fn into_response(self) -> Response {
        match self {
            ProcessingOutcome::Success { bytes, file_name } => {
                let disposition =
                    format!("attachment; filename=\"{}\"", attachment_file_name(&file_name));
                let headers = [
                    (header::CONTENT_TYPE, "application/epub+zip".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                    (header::CONTENT_LENGTH, bytes.len().to_string()),
                ];
                (StatusCode::OK, headers, bytes).into_response()
            }
            ProcessingOutcome::Failure(err) => err.into_response(),
        }
    }
}

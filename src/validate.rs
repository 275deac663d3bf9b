//! Upload validation.
//!
//! Pure functions, no I/O. Checks run in a fixed order: file presence, then
//! extension, then size, then language. Validation stops at the first
//! failure, so callers see exactly one reason.

use crate::config::ServerConfig;
use crate::error::{HyphenError, ServerResult};

/// A validated upload. Only constructible through [`validate`], so holding
/// one means the file name carries the accepted extension and the language
/// is a member of the configured set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUpload {
    file_name: String,
    language: String,
}

impl ValidUpload {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Validate an upload's name, size, and declared language against the
/// configured limits.
///
/// `file_name` is `None` when the form carried no file field at all.
pub fn validate(
    file_name: Option<&str>,
    file_size: u64,
    language: Option<&str>,
    cfg: &ServerConfig,
) -> ServerResult<ValidUpload> {
    let Some(name) = file_name else {
        return Err(HyphenError::MissingFile);
    };

    if !name.to_ascii_lowercase().ends_with(".epub") {
        return Err(HyphenError::InvalidFileType);
    }

    if file_size > cfg.max_upload_size() {
        return Err(HyphenError::FileTooLarge {
            limit_mb: cfg.max_upload_size_mb,
        });
    }

    match language {
        Some(code) if cfg.supported_languages.iter().any(|l| l == code) => Ok(ValidUpload {
            file_name: name.to_string(),
            language: code.to_string(),
        }),
        _ => Err(HyphenError::UnsupportedLanguage {
            allowed: cfg.allowed_languages(),
        }),
    }
}

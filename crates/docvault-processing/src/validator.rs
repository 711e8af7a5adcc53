use docvault_core::models::UploadedFile;
use docvault_core::{AppError, Config};

const MAX_FILENAME_BYTES: usize = 255;

/// Reasons an upload is refused before extraction starts
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File content does not match declared type {content_type}")]
    ContentMismatch { content_type: String },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

/// Upload validator: size, MIME type, filename and leading magic bytes.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_upload_size_bytes(),
            config.allowed_content_types().to_vec(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type; parameters such as `charset` are ignored.
    pub fn validate_content_type(&self, content_type: &str) -> Result<String, ValidationError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if !self.allowed_content_types.iter().any(|ct| ct == &essence) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(essence)
    }

    pub fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
        if filename.trim().is_empty()
            || filename.len() > MAX_FILENAME_BYTES
            || filename.contains(['/', '\\', '\0'])
        {
            return Err(ValidationError::InvalidFilename(filename.to_string()));
        }
        Ok(())
    }

    /// Binary formats must start with their signature so a renamed file
    /// never reaches a tool that cannot read it.
    pub fn validate_signature(&self, essence: &str, data: &[u8]) -> Result<(), ValidationError> {
        let ok = match essence {
            "application/pdf" => data.starts_with(b"%PDF"),
            "image/png" => data.starts_with(&[0x89, b'P', b'N', b'G']),
            "image/jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
            "image/gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
            _ => true,
        };
        if !ok {
            return Err(ValidationError::ContentMismatch {
                content_type: essence.to_string(),
            });
        }
        Ok(())
    }

    /// Validate all aspects of an upload
    pub fn validate_all(&self, file: &UploadedFile) -> Result<(), ValidationError> {
        self.validate_file_size(file.data.len())?;
        if file.declared_size as usize != file.data.len() {
            self.validate_file_size(file.declared_size as usize)?;
        }
        self.validate_filename(&file.filename)?;
        let essence = self.validate_content_type(&file.content_type)?;
        self.validate_signature(&essence, &file.data)?;
        Ok(())
    }
}

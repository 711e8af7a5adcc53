//! Configuration module
//!
//! Settings for the HTTP service, storage, the extraction cascade, the
//! classifier and the provisional record lifecycle. Everything is read from
//! the environment (after loading `.env`) with documented defaults.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_CONCURRENT_REQUESTS: usize = 256;

// Pipeline constants
const MAX_UPLOAD_SIZE_MB: usize = 10;
const ALLOWED_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,application/pdf,text/plain";
const PROCESSING_DEADLINE_SECS: u64 = 120;
const MISMATCH_CONFIDENCE_THRESHOLD: u8 = 70;
const NATIVE_TEXT_TIMEOUT_SECS: u64 = 30;
const RASTERIZE_OCR_TIMEOUT_SECS: u64 = 60;
const FULL_DOCUMENT_OCR_TIMEOUT_SECS: u64 = 90;
const OCR_DPI: u32 = 300;
const OCR_LANGUAGE: &str = "por+eng";

// Classifier constants
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_CLASSIFIER_MODEL: &str = "claude-sonnet-4-20250514";
const CLASSIFIER_TIMEOUT_SECS: u64 = 60;
const CLASSIFIER_MAX_INPUT_CHARS: usize = 12_000;

// Lifecycle constants
const PENDING_RECORD_TTL_HOURS: i64 = 24;
const PENDING_SWEEP_INTERVAL_SECS: u64 = 3600;

/// External tool settings for the extraction cascade.
#[derive(Clone, Debug)]
pub struct ExtractionSettings {
    pub pdftotext_path: String,
    pub pdftoppm_path: String,
    pub tesseract_path: String,
    pub ocr_language: String,
    pub ocr_dpi: u32,
    pub native_text_timeout: Duration,
    pub rasterize_ocr_timeout: Duration,
    pub full_document_ocr_timeout: Duration,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ExtractionSettings {
    /// Tool paths, OCR options and per-strategy timeouts. No key is required.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        ExtractionSettings {
            pdftotext_path: get("PDFTOTEXT_PATH").unwrap_or_else(|| "pdftotext".to_string()),
            pdftoppm_path: get("PDFTOPPM_PATH").unwrap_or_else(|| "pdftoppm".to_string()),
            tesseract_path: get("TESSERACT_PATH").unwrap_or_else(|| "tesseract".to_string()),
            ocr_language: get("OCR_LANGUAGE").unwrap_or_else(|| OCR_LANGUAGE.to_string()),
            ocr_dpi: parse_or(get("OCR_DPI"), OCR_DPI),
            native_text_timeout: Duration::from_secs(parse_or(
                get("NATIVE_TEXT_TIMEOUT_SECS"),
                NATIVE_TEXT_TIMEOUT_SECS,
            )),
            rasterize_ocr_timeout: Duration::from_secs(parse_or(
                get("RASTERIZE_OCR_TIMEOUT_SECS"),
                RASTERIZE_OCR_TIMEOUT_SECS,
            )),
            full_document_ocr_timeout: Duration::from_secs(parse_or(
                get("FULL_DOCUMENT_OCR_TIMEOUT_SECS"),
                FULL_DOCUMENT_OCR_TIMEOUT_SECS,
            )),
        }
    }
}

/// Upload size limit and MIME allow-list.
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub max_upload_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

impl UploadLimits {
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_upload_size_mb = parse_or(get("MAX_UPLOAD_SIZE_MB"), MAX_UPLOAD_SIZE_MB);
        UploadLimits {
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            allowed_content_types: split_list(
                &get("ALLOWED_CONTENT_TYPES").unwrap_or_else(|| ALLOWED_CONTENT_TYPES.to_string()),
            ),
        }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Anthropic endpoint, model and request limits. The API key is kept
/// separately so this can be logged.
#[derive(Clone, Debug)]
pub struct ClassifierSettings {
    /// Without trailing slash
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_input_chars: usize,
}

impl ClassifierSettings {
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        ClassifierSettings {
            base_url: get("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: get("ANTHROPIC_CLASSIFIER_MODEL")
                .unwrap_or_else(|| ANTHROPIC_CLASSIFIER_MODEL.to_string()),
            timeout: Duration::from_secs(parse_or(
                get("CLASSIFIER_TIMEOUT_SECS"),
                CLASSIFIER_TIMEOUT_SECS,
            )),
            max_input_chars: parse_or(
                get("CLASSIFIER_MAX_INPUT_CHARS"),
                CLASSIFIER_MAX_INPUT_CHARS,
            ),
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Base server configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub max_concurrent_requests: usize,
    pub log_format: String,
}

/// Full docvault configuration
#[derive(Clone, Debug)]
pub struct DocvaultConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload validation
    pub max_upload_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    // Pipeline
    pub processing_deadline: Duration,
    /// Confidence the classifier must exceed before a disagreement is surfaced
    pub mismatch_confidence_threshold: u8,
    pub extraction: ExtractionSettings,
    // Classifier
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub classifier_model: String,
    pub classifier_timeout: Duration,
    pub classifier_max_input_chars: usize,
    // Provisional record lifecycle
    pub pending_record_ttl_hours: i64,
    pub pending_sweep_interval_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<DocvaultConfig>);

impl Config {
    fn inner(&self) -> &DocvaultConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = DocvaultConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.inner().base.max_concurrent_requests
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.inner().allowed_content_types
    }

    pub fn processing_deadline(&self) -> Duration {
        self.inner().processing_deadline
    }

    pub fn mismatch_confidence_threshold(&self) -> u8 {
        self.inner().mismatch_confidence_threshold
    }

    pub fn extraction(&self) -> &ExtractionSettings {
        &self.inner().extraction
    }

    pub fn anthropic_api_key(&self) -> Option<&str> {
        self.inner().anthropic_api_key.as_deref()
    }

    pub fn anthropic_base_url(&self) -> &str {
        &self.inner().anthropic_base_url
    }

    pub fn classifier_model(&self) -> &str {
        &self.inner().classifier_model
    }

    pub fn classifier_timeout(&self) -> Duration {
        self.inner().classifier_timeout
    }

    pub fn classifier_max_input_chars(&self) -> usize {
        self.inner().classifier_max_input_chars
    }

    pub fn classifier_settings(&self) -> ClassifierSettings {
        let inner = self.inner();
        ClassifierSettings {
            base_url: inner.anthropic_base_url.trim_end_matches('/').to_string(),
            model: inner.classifier_model.clone(),
            timeout: inner.classifier_timeout,
            max_input_chars: inner.classifier_max_input_chars,
        }
    }

    pub fn pending_record_ttl_hours(&self) -> i64 {
        self.inner().pending_record_ttl_hours
    }

    pub fn pending_sweep_interval_secs(&self) -> u64 {
        self.inner().pending_sweep_interval_secs
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl DocvaultConfig {
    /// Build configuration from a key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(get: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = get("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let base = BaseConfig {
            server_port: match get("PORT") {
                Some(port) => port
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => PORT,
            },
            environment,
            cors_origins: cors_origins_str
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), MAX_CONNECTIONS),
            db_timeout_seconds: parse_or(get("DB_TIMEOUT_SECONDS"), CONNECTION_TIMEOUT_SECS),
            jwt_secret: get("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            max_concurrent_requests: parse_or(
                get("MAX_CONCURRENT_REQUESTS"),
                MAX_CONCURRENT_REQUESTS,
            ),
            log_format: get("LOG_FORMAT")
                .unwrap_or_else(|| "pretty".to_string())
                .to_lowercase(),
        };

        let storage_backend = match get("STORAGE_BACKEND") {
            Some(value) => Some(value.parse::<StorageBackend>()?),
            None => None,
        };

        let upload = UploadLimits::from_lookup(&get);
        let classifier = ClassifierSettings::from_lookup(&get);

        Ok(DocvaultConfig {
            base,
            database_url: get("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: get("S3_BUCKET"),
            s3_region: get("S3_REGION").or_else(|| get("AWS_REGION")),
            s3_endpoint: get("S3_ENDPOINT"),
            local_storage_path: get("LOCAL_STORAGE_PATH"),
            local_storage_base_url: get("LOCAL_STORAGE_BASE_URL"),
            max_upload_size_bytes: upload.max_upload_size_bytes,
            allowed_content_types: upload.allowed_content_types,
            processing_deadline: Duration::from_secs(parse_or(
                get("PROCESSING_DEADLINE_SECS"),
                PROCESSING_DEADLINE_SECS,
            )),
            mismatch_confidence_threshold: parse_or(
                get("MISMATCH_CONFIDENCE_THRESHOLD"),
                MISMATCH_CONFIDENCE_THRESHOLD,
            ),
            extraction: ExtractionSettings::from_lookup(&get),
            anthropic_api_key: get("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()),
            anthropic_base_url: classifier.base_url,
            classifier_model: classifier.model,
            classifier_timeout: classifier.timeout,
            classifier_max_input_chars: classifier.max_input_chars,
            pending_record_ttl_hours: parse_or(
                get("PENDING_RECORD_TTL_HOURS"),
                PENDING_RECORD_TTL_HOURS,
            ),
            pending_sweep_interval_secs: parse_or(
                get("PENDING_SWEEP_INTERVAL_SECS"),
                PENDING_SWEEP_INTERVAL_SECS,
            ),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.processing_deadline.is_zero() {
            return Err(anyhow::anyhow!(
                "PROCESSING_DEADLINE_SECS must be greater than zero"
            ));
        }

        if self.mismatch_confidence_threshold > 100 {
            return Err(anyhow::anyhow!(
                "MISMATCH_CONFIDENCE_THRESHOLD must be between 0 and 100"
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than zero"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES must not be empty"));
        }

        if self.pending_record_ttl_hours <= 0 {
            return Err(anyhow::anyhow!(
                "PENDING_RECORD_TTL_HOURS must be greater than zero"
            ));
        }

        let backend = self.storage_backend.unwrap_or(StorageBackend::Local);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

//! `docvault`: run the extraction cascade and the classifier against local
//! files, and mint API tokens for testing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docvault_api::auth::JwtKeys;
use docvault_classifier::{ClaudeClassifierConfig, ClaudeDocumentClassifier};
use docvault_cli::{
    guess_content_type, init_tracing, override_classifier_settings, render_attempts,
};
use docvault_core::models::{
    ClassificationResult, DocumentType, ExtractionAttempt, ExtractionResult, MismatchVerdict,
    UploadedFile,
};
use docvault_core::{ClassifierSettings, ExtractionSettings, UploadLimits};
use docvault_services::{reconcile, DocumentClassifier, ExtractionEngine, UploadValidator};
use serde::Serialize;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "docvault")]
#[command(about = "Docvault pipeline tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the extraction cascade on a local file and show every attempt
    Extract {
        file: PathBuf,
        /// MIME type; guessed from the extension when omitted
        #[arg(long)]
        content_type: Option<String>,
        /// Tesseract language list (defaults to OCR_LANGUAGE)
        #[arg(long)]
        lang: Option<String>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Extract, then classify the text against a declared type
    Classify {
        file: PathBuf,
        /// Type the user would declare (medical, financial, budget, personal, legal,
        /// education, work or other)
        #[arg(long)]
        declared: DocumentType,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        api_key: String,
        /// Defaults to ANTHROPIC_BASE_URL
        #[arg(long)]
        base_url: Option<String>,
        /// Defaults to ANTHROPIC_CLASSIFIER_MODEL
        #[arg(long)]
        model: Option<String>,
        /// Defaults to CLASSIFIER_TIMEOUT_SECS
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Issue a bearer token for the API
    Token {
        #[arg(long)]
        user: Option<Uuid>,
        #[arg(long, default_value = "24")]
        ttl_hours: i64,
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractReport<'a> {
    file: String,
    content_type: &'a str,
    strategy_used: Option<String>,
    text: Option<&'a str>,
    markers: &'a [String],
    attempts: &'a [ExtractionAttempt],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyReport {
    declared_type: DocumentType,
    classification: ClassificationResult,
    classification_mismatch: Option<MismatchVerdict>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenReport {
    user_id: Uuid,
    expires_at: chrono::DateTime<chrono::Utc>,
    token: String,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read and validate a local file the way the upload endpoint does.
async fn load_upload(
    file: &Path,
    content_type: Option<String>,
    declared: DocumentType,
) -> Result<UploadedFile> {
    let content_type = match content_type {
        Some(ct) => ct,
        None => guess_content_type(file)
            .map(str::to_string)
            .with_context(|| {
                format!(
                    "Cannot guess the content type of {}; pass --content-type",
                    file.display()
                )
            })?,
    };
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());

    let upload = UploadedFile::new(filename, content_type, declared, data);
    let limits = UploadLimits::from_lookup(env_var);
    UploadValidator::new(limits.max_upload_size_bytes, limits.allowed_content_types)
        .validate_all(&upload)?;
    Ok(upload)
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn engine(lang: Option<String>) -> ExtractionEngine {
    let mut settings = ExtractionSettings::from_lookup(env_var);
    if let Some(lang) = lang {
        settings.ocr_language = lang;
    }
    ExtractionEngine::from_settings(&settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            file,
            content_type,
            lang,
            format,
        } => {
            let upload = load_upload(&file, content_type, DocumentType::Other).await?;
            let result = engine(lang).extract(&upload).await?;

            match format {
                OutputFormat::Json => {
                    let (text, markers) = match &result {
                        ExtractionResult::Text(t) => (Some(t.content.as_str()), t.quality.markers()),
                        ExtractionResult::Failed { .. } => (None, &[][..]),
                    };
                    print_json(&ExtractReport {
                        file: file.display().to_string(),
                        content_type: &upload.content_type,
                        strategy_used: result.strategy_used().map(|k| k.to_string()),
                        text,
                        markers,
                        attempts: result.attempts(),
                    })?;
                }
                OutputFormat::Table => {
                    print!("{}", render_attempts(result.attempts()));
                    match &result {
                        ExtractionResult::Text(t) => {
                            println!();
                            if !t.quality.is_clean() {
                                println!("Markers: {}", t.quality.markers().join(", "));
                            }
                            println!("{}", t.content);
                        }
                        ExtractionResult::Failed { .. } => {
                            println!("\nNo text could be extracted.");
                        }
                    }
                }
            }

            if matches!(result, ExtractionResult::Failed { .. }) {
                std::process::exit(2);
            }
        }
        Commands::Classify {
            file,
            declared,
            content_type,
            api_key,
            base_url,
            model,
            timeout_secs,
        } => {
            let upload = load_upload(&file, content_type, declared).await?;
            let text = match engine(None).extract(&upload).await? {
                ExtractionResult::Text(t) => t.content,
                ExtractionResult::Failed { attempts } => {
                    eprint!("{}", render_attempts(&attempts));
                    anyhow::bail!("No text could be extracted from {}", file.display());
                }
            };

            let settings = override_classifier_settings(
                ClassifierSettings::from_lookup(env_var),
                base_url,
                model,
                timeout_secs,
            );
            let classifier: Arc<dyn DocumentClassifier> = Arc::new(
                ClaudeDocumentClassifier::new(ClaudeClassifierConfig::from_settings(
                    api_key, &settings,
                ))?,
            );

            let classification = classifier.classify(&text, declared).await;
            let classification_mismatch = reconcile(declared, &classification);
            print_json(&ClassifyReport {
                declared_type: declared,
                classification,
                classification_mismatch,
            })?;
        }
        Commands::Token {
            user,
            ttl_hours,
            secret,
        } => {
            if ttl_hours <= 0 {
                anyhow::bail!("--ttl-hours must be positive");
            }
            let user_id = user.unwrap_or_else(Uuid::new_v4);
            let ttl = chrono::Duration::hours(ttl_hours);
            let token = JwtKeys::from_secret(&secret).issue(user_id, ttl)?;
            print_json(&TokenReport {
                user_id,
                expires_at: chrono::Utc::now() + ttl,
                token,
            })?;
        }
    }

    Ok(())
}

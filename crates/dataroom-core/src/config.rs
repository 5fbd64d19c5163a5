//! Configuration module
//!
//! Configuration for the upload pipeline: validation limits, retry policy,
//! and storage backend selection. Values are read from the environment with
//! sensible defaults; `validate()` enforces the requirements of the selected
//! storage backend.

use std::env;

use crate::storage_types::BackendKind;

// Defaults
const MAX_FILE_SIZE_MB: u64 = 50;
const MAX_CONCURRENT_UPLOADS: usize = 3;
const RETRY_ATTEMPTS: u32 = 2;
const RETRY_DELAY_MS: u64 = 500;
const SIMULATED_STEP_DELAY_MS: u64 = 120;

const DEFAULT_EXTENSIONS: &str = "pdf,doc,docx,xls,xlsx,ppt,pptx,csv,txt,jpg,jpeg,png";
const DEFAULT_CONTENT_TYPES: &str = "application/pdf,\
application/msword,\
application/vnd.openxmlformats-officedocument.wordprocessingml.document,\
application/vnd.ms-excel,\
application/vnd.openxmlformats-officedocument.spreadsheetml.sheet,\
application/vnd.ms-powerpoint,\
application/vnd.openxmlformats-officedocument.presentationml.presentation,\
text/csv,text/plain,image/jpeg,image/png";

/// Pipeline configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Single-file byte cap; batch size is not limited.
    pub max_file_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    /// Declared upload parallelism. Scheduling is currently sequential; the
    /// value is kept so callers can configure it ahead of a fan-out
    /// implementation.
    pub max_concurrent_uploads: usize,
    /// Re-attempts per file after a failed store call (0 = single try).
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    /// Best-effort delete of stored objects when confirmation fails.
    pub cleanup_orphans: bool,
    /// Delay between progress ticks of the simulated backend.
    pub simulated_step_delay_ms: u64,
    // Storage backend configuration
    pub storage_backend: Option<BackendKind>,
    pub force_simulated: bool,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| DEFAULT_EXTENSIONS.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| DEFAULT_CONTENT_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let storage_backend =
            env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|s| match s.to_lowercase().as_str() {
                    "remote" => Some(BackendKind::Remote),
                    "simulated" => Some(BackendKind::Simulated),
                    _ => None,
                });

        let config = PipelineConfig {
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
            allowed_content_types,
            max_concurrent_uploads: env::var("MAX_CONCURRENT_UPLOADS")
                .unwrap_or_else(|_| MAX_CONCURRENT_UPLOADS.to_string())
                .parse()
                .unwrap_or(MAX_CONCURRENT_UPLOADS),
            retry_attempts: env::var("UPLOAD_RETRY_ATTEMPTS")
                .unwrap_or_else(|_| RETRY_ATTEMPTS.to_string())
                .parse()
                .unwrap_or(RETRY_ATTEMPTS),
            retry_delay_ms: env::var("UPLOAD_RETRY_DELAY_MS")
                .unwrap_or_else(|_| RETRY_DELAY_MS.to_string())
                .parse()
                .unwrap_or(RETRY_DELAY_MS),
            cleanup_orphans: env::var("CLEANUP_ORPHANS")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            simulated_step_delay_ms: env::var("SIMULATED_STEP_DELAY_MS")
                .unwrap_or_else(|_| SIMULATED_STEP_DELAY_MS.to_string())
                .parse()
                .unwrap_or(SIMULATED_STEP_DELAY_MS),
            storage_backend,
            force_simulated: env::var("FORCE_SIMULATED_STORAGE")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            s3_bucket: env::var("S3_BUCKET").ok().filter(|s| !s.is_empty()),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok()
                .filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective storage backend, once per process.
    ///
    /// `force_simulated` wins over everything; an explicit `STORAGE_BACKEND`
    /// wins over inference; otherwise remote is used when a bucket is
    /// configured and simulated when not.
    pub fn resolved_backend(&self) -> BackendKind {
        if self.force_simulated {
            return BackendKind::Simulated;
        }
        if let Some(backend) = self.storage_backend {
            return backend;
        }
        if self.s3_bucket.is_some() {
            BackendKind::Remote
        } else {
            BackendKind::Simulated
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.allowed_extensions.is_empty() && self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "At least one of ALLOWED_EXTENSIONS or ALLOWED_CONTENT_TYPES must be non-empty"
            ));
        }

        if self.resolved_backend() == BackendKind::Remote {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using the remote storage backend"
                ));
            }
            if self.s3_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using the remote storage backend"
                ));
            }
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_extensions: DEFAULT_EXTENSIONS
                .split(',')
                .map(|s| s.to_string())
                .collect(),
            allowed_content_types: DEFAULT_CONTENT_TYPES
                .split(',')
                .map(|s| s.to_string())
                .collect(),
            max_concurrent_uploads: MAX_CONCURRENT_UPLOADS,
            retry_attempts: RETRY_ATTEMPTS,
            retry_delay_ms: RETRY_DELAY_MS,
            cleanup_orphans: false,
            simulated_step_delay_ms: SIMULATED_STEP_DELAY_MS,
            storage_backend: None,
            force_simulated: false,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
        }
    }
}

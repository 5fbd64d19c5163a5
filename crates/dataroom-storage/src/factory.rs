#[cfg(feature = "storage-remote")]
use crate::RemoteStorage;
#[cfg(feature = "storage-simulated")]
use crate::SimulatedStorage;
use crate::{BackendKind, Storage, StorageError, StorageResult};
use dataroom_core::PipelineConfig;
use std::sync::Arc;
#[cfg(feature = "storage-simulated")]
use std::time::Duration;

/// Create a storage backend based on configuration
///
/// This is the production wiring point only: the orchestrator itself takes
/// whatever `Arc<dyn Storage>` it is handed, so tests substitute a fake
/// backend without touching configuration.
pub async fn create_storage(config: &PipelineConfig) -> StorageResult<Arc<dyn Storage>> {
    match config.resolved_backend() {
        #[cfg(feature = "storage-remote")]
        BackendKind::Remote => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.s3_endpoint.clone();

            let storage = RemoteStorage::new(bucket, region, endpoint).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-remote"))]
        BackendKind::Remote => Err(StorageError::ConfigError(
            "Remote storage backend not available (storage-remote feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-simulated")]
        BackendKind::Simulated => {
            let storage =
                SimulatedStorage::new(Duration::from_millis(config.simulated_step_delay_ms));
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-simulated"))]
        BackendKind::Simulated => Err(StorageError::ConfigError(
            "Simulated storage backend not available (storage-simulated feature not enabled)"
                .to_string(),
        )),
    }
}

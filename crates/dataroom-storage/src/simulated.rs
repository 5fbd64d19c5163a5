use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dataroom_core::BackendKind;
use uuid::Uuid;

use crate::keys;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};

/// Progress ticks a simulated transfer walks through.
const PROGRESS_STEPS: [u8; 5] = [20, 40, 60, 80, 100];

const URL_SCHEME: &str = "simulated";

/// Simulated storage backend.
///
/// Never contacts a network: a store call walks a fixed progress sequence
/// with a short artificial delay between ticks, records the key in an
/// in-memory map, and succeeds. Used when no remote service is configured
/// or when explicitly forced by configuration; tests pass a zero delay.
pub struct SimulatedStorage {
    step_delay: Duration,
    objects: Mutex<HashMap<String, u64>>,
}

impl SimulatedStorage {
    pub fn new(step_delay: Duration) -> Self {
        SimulatedStorage {
            step_delay,
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Number of objects currently held by the backend.
    pub fn object_count(&self) -> usize {
        self.objects.lock().expect("objects lock poisoned").len()
    }
}

impl Default for SimulatedStorage {
    fn default() -> Self {
        SimulatedStorage::new(Duration::from_millis(120))
    }
}

#[async_trait]
impl Storage for SimulatedStorage {
    async fn store(
        &self,
        project_id: Uuid,
        filename: &str,
        _content_type: &str,
        data: Bytes,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> StorageResult<StoredObject> {
        let key = keys::namespaced_key(project_id, filename)?;
        let size = data.len() as u64;

        for step in PROGRESS_STEPS {
            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }
            on_progress(step);
        }

        self.objects
            .lock()
            .expect("objects lock poisoned")
            .insert(key.clone(), size);

        let url = format!("{}://{}", URL_SCHEME, key);

        tracing::info!(
            key = %key,
            size_bytes = size,
            "Simulated upload successful"
        );

        Ok(StoredObject { key, url })
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self
            .objects
            .lock()
            .expect("objects lock poisoned")
            .contains_key(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects
            .lock()
            .expect("objects lock poisoned")
            .remove(key);
        Ok(())
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Simulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU8, Ordering};

    fn storage() -> SimulatedStorage {
        SimulatedStorage::new(Duration::ZERO)
    }

    #[tokio::test]
    async fn store_reports_monotonic_progress_ending_at_100() {
        let storage = storage();
        let ticks = Mutex::new(Vec::new());

        storage
            .store(
                Uuid::new_v4(),
                "liasse_2023.pdf",
                "application/pdf",
                Bytes::from_static(b"content"),
                &|p| ticks.lock().unwrap().push(p),
            )
            .await
            .unwrap();

        let ticks = ticks.into_inner().unwrap();
        assert_eq!(*ticks.last().unwrap(), 100);
        assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn stored_objects_are_visible_to_exists() {
        let storage = storage();
        let object = storage
            .store(
                Uuid::new_v4(),
                "kbis.pdf",
                "application/pdf",
                Bytes::from_static(b"abc"),
                &|_| {},
            )
            .await
            .unwrap();

        assert!(storage.exists(&object.key).await.unwrap());
        assert!(!storage.exists("missing/key.pdf").await.unwrap());

        storage.delete(&object.key).await.unwrap();
        assert!(!storage.exists(&object.key).await.unwrap());
    }

    #[tokio::test]
    async fn url_references_the_key() {
        let storage = storage();
        let object = storage
            .store(
                Uuid::new_v4(),
                "statuts.pdf",
                "application/pdf",
                Bytes::new(),
                &|_| {},
            )
            .await
            .unwrap();
        assert_eq!(object.url, format!("simulated://{}", object.key));
    }

    #[tokio::test]
    async fn progress_callback_can_count_ticks() {
        let storage = storage();
        let tick_count = AtomicU8::new(0);
        storage
            .store(
                Uuid::new_v4(),
                "paie_01.pdf",
                "application/pdf",
                Bytes::from_static(b"x"),
                &|_| {
                    tick_count.fetch_add(1, Ordering::SeqCst);
                },
            )
            .await
            .unwrap();
        assert_eq!(tick_count.load(Ordering::SeqCst) as usize, PROGRESS_STEPS.len());
    }
}

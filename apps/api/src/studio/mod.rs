//! Interactive background-removal studio.
//!
//! Each browser visit opens a [`Session`]. A session remembers every upload it
//! has processed, keyed by the exact upload bytes, so resubmitting the same
//! file returns the earlier PNG without calling the model again.

pub mod handlers;
pub mod page;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::background::{remove_background, BackgroundError, BackgroundRemover};

/// File extensions the studio's picker accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "bmp", "tiff", "gif"];

/// Filename offered by the download action.
pub const DOWNLOAD_FILENAME: &str = "processed_image.png";

/// Returns true if the filename ends in one of [`ACCEPTED_EXTENSIONS`].
pub fn is_accepted_filename(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ACCEPTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Outcome of processing one upload within a session.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub png: Bytes,
    pub cache_hit: bool,
}

#[derive(Default)]
struct SessionInner {
    cache: HashMap<Bytes, Bytes>,
    latest: Option<Bytes>,
}

#[derive(Default)]
pub struct Session {
    inner: Mutex<SessionInner>,
}

impl Session {
    /// Processes an upload, consulting the session cache first.
    /// The lock is not held across the model call.
    pub async fn process(
        &self,
        remover: &dyn BackgroundRemover,
        upload: Bytes,
    ) -> Result<ProcessedImage, BackgroundError> {
        {
            let mut inner = self.inner.lock().await;
            if let Some(png) = inner.cache.get(&upload).cloned() {
                inner.latest = Some(png.clone());
                return Ok(ProcessedImage {
                    png,
                    cache_hit: true,
                });
            }
        }

        let asset = remove_background(remover, upload.clone()).await?;

        let mut inner = self.inner.lock().await;
        inner.cache.insert(upload, asset.bytes.clone());
        inner.latest = Some(asset.bytes.clone());
        Ok(ProcessedImage {
            png: asset.bytes,
            cache_hit: false,
        })
    }

    /// The most recent successful result, offered by the download action.
    pub async fn latest(&self) -> Option<Bytes> {
        self.inner.lock().await.latest.clone()
    }

    pub async fn cached_entries(&self) -> usize {
        self.inner.lock().await.cache.len()
    }
}

struct Entry {
    session: Arc<Session>,
    last_seen: Instant,
}

/// All live studio sessions. A session left idle for longer than the
/// registry's idle timeout is dropped along with its cache.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Opens a fresh session, sweeping out idle ones first.
    pub async fn open(&self) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);
        let expired = before - sessions.len();
        if expired > 0 {
            info!("Expired {expired} idle studio sessions");
        }

        sessions.insert(
            id,
            Entry {
                session: Arc::new(Session::default()),
                last_seen: now,
            },
        );
        info!("Opened studio session {id} ({} live)", sessions.len());
        id
    }

    /// Looks up a live session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let expired = match sessions.get(&id) {
            Some(entry) => now.duration_since(entry.last_seen) >= self.idle_timeout,
            None => {
                debug!("Unknown studio session {id}");
                return None;
            }
        };
        if expired {
            sessions.remove(&id);
            info!("Studio session {id} expired");
            return None;
        }

        let entry = sessions.get_mut(&id)?;
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    pub async fn live_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use image::ImageFormat;

    use super::*;
    use crate::background::testing::{sample_image, FailingRemover, HalfMaskRemover};

    const IDLE: Duration = Duration::from_secs(60 * 60);

    #[test]
    fn test_accepted_extensions_are_case_insensitive() {
        assert!(is_accepted_filename("holiday.JPG"));
        assert!(is_accepted_filename("scan.tiff"));
        assert!(is_accepted_filename("a.b.webp"));
        assert!(!is_accepted_filename("resume.pdf"));
        assert!(!is_accepted_filename("no_extension"));
    }

    #[tokio::test]
    async fn test_identical_upload_is_served_from_cache() {
        let remover = HalfMaskRemover::default();
        let session = Session::default();
        let upload = sample_image(ImageFormat::Png, 120);

        let first = session.process(&remover, upload.clone()).await.unwrap();
        let second = session.process(&remover, upload).await.unwrap();

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.png, second.png);
        assert_eq!(remover.calls(), 1);
    }

    #[tokio::test]
    async fn test_different_uploads_each_reach_model() {
        let remover = HalfMaskRemover::default();
        let session = Session::default();

        session
            .process(&remover, sample_image(ImageFormat::Png, 1))
            .await
            .unwrap();
        session
            .process(&remover, sample_image(ImageFormat::Png, 2))
            .await
            .unwrap();

        assert_eq!(remover.calls(), 2);
        assert_eq!(session.cached_entries().await, 2);
    }

    #[tokio::test]
    async fn test_caches_are_per_session() {
        let remover = HalfMaskRemover::default();
        let registry = SessionRegistry::new(IDLE);
        let a = registry.get(registry.open().await).await.unwrap();
        let b = registry.get(registry.open().await).await.unwrap();
        let upload = sample_image(ImageFormat::Bmp, 33);

        a.process(&remover, upload.clone()).await.unwrap();
        let from_b = b.process(&remover, upload).await.unwrap();

        assert!(!from_b.cache_hit);
        assert_eq!(remover.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_leaves_session_usable() {
        let session = Session::default();
        let upload = sample_image(ImageFormat::Png, 7);

        assert!(session.process(&FailingRemover, upload.clone()).await.is_err());
        assert_eq!(session.cached_entries().await, 0);
        assert!(session.latest().await.is_none());

        let remover = HalfMaskRemover::default();
        let ok = session.process(&remover, upload).await.unwrap();
        assert!(!ok.cache_hit);
        assert_eq!(session.latest().await, Some(ok.png));
    }

    #[tokio::test]
    async fn test_unknown_session_is_none() {
        let registry = SessionRegistry::new(IDLE);
        assert!(registry.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire_and_active_ones_keep_their_cache() {
        let remover = HalfMaskRemover::default();
        let registry = SessionRegistry::new(IDLE);
        let active = registry.open().await;
        let idle = registry.open().await;

        let session = registry.get(active).await.unwrap();
        session
            .process(&remover, sample_image(ImageFormat::Png, 9))
            .await
            .unwrap();
        drop(session);

        tokio::time::advance(Duration::from_secs(40 * 60)).await;
        assert!(registry.get(active).await.is_some());

        tokio::time::advance(Duration::from_secs(40 * 60)).await;
        registry.open().await;

        assert_eq!(registry.live_count().await, 2);
        assert!(registry.get(idle).await.is_none());
        let survivor = registry.get(active).await.unwrap();
        assert_eq!(survivor.cached_entries().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_is_not_served() {
        let registry = SessionRegistry::new(IDLE);
        let id = registry.open().await;

        tokio::time::advance(IDLE).await;

        assert!(registry.get(id).await.is_none());
        assert_eq!(registry.live_count().await, 0);
    }
}

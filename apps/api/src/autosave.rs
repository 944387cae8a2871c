//! Debounced auto-save of the resume draft.
//!
//! `AutoSaver` owns its pending timer and the last value it persisted. Each change
//! restarts the timer; when it fires the draft is serialized and written under a single
//! key, unless the serialized value is identical to the last write.
//!
//! Writes are async and never run under the state lock. A separate write lock orders
//! them, and a write only goes ahead if no newer draft superseded it while it waited.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::resume::ResumeData;

pub const AUTOSAVE_KEY: &str = "resume-autosave";
pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

// ────────────────────────────────────────────────────────────────────────────
// Stores
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Key/value persistence for serialized drafts.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        // write-then-rename so a crash never leaves a half-written draft
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// In-memory store that also counts writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AutoSaver
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SaveState {
    last_saved: Option<String>,
    pending: Option<JoinHandle<()>>,
    /// The draft the pending timer will write.
    pending_draft: Option<String>,
    /// Bumped by every schedule/flush/dispose; a timer only writes if it is still current.
    generation: u64,
}

/// Everything the timer task needs, shared with the saver.
struct Shared {
    store: Arc<dyn SnapshotStore>,
    key: String,
    state: Mutex<SaveState>,
    /// Held across each store write so writes land in the order they were decided.
    write_lock: tokio::sync::Mutex<()>,
}

impl Shared {
    fn state(&self) -> std::sync::MutexGuard<'_, SaveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes `serialized` unless it matches the last write. Caller holds `write_lock`.
    async fn persist(&self, serialized: String) -> bool {
        let unchanged = self.state().last_saved.as_deref() == Some(serialized.as_str());
        if unchanged {
            debug!("Auto-save: draft unchanged, skipping write");
            return true;
        }

        match self.store.write(&self.key, &serialized).await {
            Ok(()) => {
                debug!(bytes = serialized.len(), "Auto-save: draft written");
                self.state().last_saved = Some(serialized);
                true
            }
            Err(e) => {
                warn!("Auto-save: failed to write draft: {e}");
                false
            }
        }
    }
}

pub struct AutoSaver {
    shared: Arc<Shared>,
    delay: Duration,
}

impl AutoSaver {
    pub fn new(store: Arc<dyn SnapshotStore>, delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                key: AUTOSAVE_KEY.to_string(),
                state: Mutex::new(SaveState::default()),
                write_lock: tokio::sync::Mutex::new(()),
            }),
            delay,
        }
    }

    /// Restarts the save timer with the latest draft. Must be called inside a tokio runtime.
    ///
    /// Returns false if the draft could not be serialized; nothing is scheduled then.
    pub fn schedule(&self, data: &ResumeData) -> bool {
        let Some(serialized) = serialize(data) else {
            return false;
        };

        let mut state = self.shared.state();
        cancel_pending(&mut state);
        let generation = state.generation;
        state.pending_draft = Some(serialized.clone());

        let shared = Arc::clone(&self.shared);
        let delay = self.delay;
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _write = shared.write_lock.lock().await;
            {
                let mut state = shared.state();
                if state.generation != generation {
                    return;
                }
                // claimed: a later schedule starts a new timer instead of aborting this write
                state.pending = None;
                state.pending_draft = None;
            }
            shared.persist(serialized).await;
        }));
        true
    }

    /// Cancels any pending timer and writes `data` immediately.
    pub async fn save_now(&self, data: &ResumeData) -> bool {
        let Some(serialized) = serialize(data) else {
            return false;
        };
        let _write = self.shared.write_lock.lock().await;
        cancel_pending(&mut self.shared.state());
        self.shared.persist(serialized).await
    }

    /// Writes the pending draft right away, if there is one.
    pub async fn flush(&self) -> bool {
        let _write = self.shared.write_lock.lock().await;
        let draft = {
            let mut state = self.shared.state();
            let draft = state.pending_draft.take();
            cancel_pending(&mut state);
            draft
        };
        match draft {
            Some(serialized) => self.shared.persist(serialized).await,
            None => true,
        }
    }

    /// Cancels the pending timer, if any. The saver stays usable afterwards.
    pub fn dispose(&self) {
        cancel_pending(&mut self.shared.state());
    }

    pub fn has_pending(&self) -> bool {
        self.shared.state().pending.is_some()
    }

    /// The most recently persisted draft, read back from the store.
    pub async fn load(&self) -> Option<ResumeData> {
        let raw = match self.shared.store.read(&self.shared.key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Auto-save: failed to read draft: {e}");
                return None;
            }
        };
        parse(&raw)
    }

    /// The newest draft this saver knows about: the pending one, else the persisted one.
    pub async fn latest(&self) -> Option<ResumeData> {
        let pending = self.shared.state().pending_draft.clone();
        match pending {
            Some(raw) => parse(&raw),
            None => self.load().await,
        }
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn serialize(data: &ResumeData) -> Option<String> {
    match serde_json::to_string(data) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Auto-save: failed to serialize draft: {e}");
            None
        }
    }
}

fn parse(raw: &str) -> Option<ResumeData> {
    match serde_json::from_str(raw) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("Auto-save: stored draft is not valid JSON: {e}");
            None
        }
    }
}

fn cancel_pending(state: &mut SaveState) {
    if let Some(handle) = state.pending.take() {
        handle.abort();
    }
    state.pending_draft = None;
    state.generation += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    /// A store whose writes take `latency` to land.
    struct SlowStore {
        inner: MemoryStore,
        latency: Duration,
    }

    #[async_trait]
    impl SnapshotStore for SlowStore {
        async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.read(key).await
        }

        async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
            tokio::time::sleep(self.latency).await;
            self.inner.write(key, value).await
        }
    }

    fn make_saver() -> (AutoSaver, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let saver = AutoSaver::new(store.clone(), DEFAULT_DELAY);
        (saver, store)
    }

    fn draft(summary: &str) -> ResumeData {
        ResumeData {
            summary: summary.to_string(),
            ..Default::default()
        }
    }

    /// Lets the clock pass `ms` and gives woken tasks a chance to run.
    async fn elapse(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_after_delay() {
        let (saver, store) = make_saver();
        assert!(saver.schedule(&draft("a")));
        elapse(1500).await;
        assert_eq!(store.write_count(), 0);
        assert!(saver.has_pending());

        elapse(600).await;
        assert_eq!(store.write_count(), 1);
        assert!(!saver.has_pending());
        assert_eq!(saver.load().await, Some(draft("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_value_is_not_rewritten() {
        let (saver, store) = make_saver();
        saver.schedule(&draft("a"));
        elapse(2100).await;
        saver.schedule(&draft("a"));
        elapse(2100).await;
        saver.schedule(&draft("b"));
        elapse(2100).await;
        saver.schedule(&draft("b"));
        elapse(2100).await;
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_collapse_into_one_write() {
        let (saver, store) = make_saver();
        saver.schedule(&draft("a"));
        elapse(1000).await;
        saver.schedule(&draft("ab"));
        elapse(1000).await;
        saver.schedule(&draft("abc"));
        elapse(1500).await;
        assert_eq!(store.write_count(), 0);

        elapse(600).await;
        assert_eq!(store.write_count(), 1);
        assert_eq!(saver.load().await, Some(draft("abc")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_pending_write() {
        let (saver, store) = make_saver();
        saver.schedule(&draft("a"));
        saver.dispose();
        assert!(!saver.has_pending());
        elapse(5000).await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_write() {
        let (saver, store) = make_saver();
        saver.schedule(&draft("a"));
        drop(saver);
        elapse(5000).await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_flushes_and_skips_duplicates() {
        let (saver, store) = make_saver();
        saver.schedule(&draft("a"));
        assert!(saver.save_now(&draft("a")).await);
        assert!(saver.save_now(&draft("a")).await);
        elapse(5000).await;
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_reports_false_and_retries_next_time() {
        let saver = AutoSaver::new(Arc::new(FailingStore), DEFAULT_DELAY);
        assert!(!saver.save_now(&draft("a")).await);
        assert!(!saver.save_now(&draft("a")).await);
        assert_eq!(saver.load().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_pending_draft() {
        let (saver, store) = make_saver();
        assert!(saver.flush().await);
        assert_eq!(store.write_count(), 0);

        saver.schedule(&draft("a"));
        assert_eq!(saver.latest().await, Some(draft("a")));
        assert!(saver.flush().await);
        assert!(!saver.has_pending());
        assert_eq!(store.write_count(), 1);

        elapse(5000).await;
        assert_eq!(store.write_count(), 1);
        assert_eq!(saver.latest().await, Some(draft("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_write_does_not_block_new_edits() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::default(),
            latency: Duration::from_millis(1000),
        });
        let saver = AutoSaver::new(store.clone(), DEFAULT_DELAY);

        saver.schedule(&draft("a"));
        elapse(2100).await;
        // "a" is mid-write; the saver stays usable
        assert!(!saver.has_pending());
        assert!(saver.schedule(&draft("b")));
        assert!(saver.has_pending());

        elapse(1000).await;
        assert_eq!(store.inner.write_count(), 1);
        assert_eq!(saver.load().await, Some(draft("a")));

        elapse(3000).await;
        assert_eq!(store.inner.write_count(), 2);
        assert_eq!(saver.load().await, Some(draft("b")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_supersedes_waiting_timer() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::default(),
            latency: Duration::from_millis(1000),
        });
        let saver = AutoSaver::new(store.clone(), DEFAULT_DELAY);

        assert!(saver.save_now(&draft("a")).await);
        saver.schedule(&draft("b"));
        assert!(saver.save_now(&draft("c")).await);
        elapse(5000).await;
        assert_eq!(store.inner.write_count(), 2);
        assert_eq!(saver.load().await, Some(draft("c")));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("drafts")).await.unwrap();
        assert_eq!(store.read(AUTOSAVE_KEY).await.unwrap(), None);
        store
            .write(AUTOSAVE_KEY, "{\"summary\":\"x\"}")
            .await
            .unwrap();
        assert_eq!(
            store.read(AUTOSAVE_KEY).await.unwrap().as_deref(),
            Some("{\"summary\":\"x\"}")
        );
        assert!(dir.path().join("drafts").join("resume-autosave.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();
        assert!(matches!(
            store.write("../escape", "x").await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.read("").await, Err(StoreError::InvalidKey(_))));
    }
}

//! Embedded entity store
//!
//! Keyed entity boxes with query building and change subscriptions. This is
//! the local persistence the home caches read from; the sync pipeline is the
//! only writer by convention, readers go through [`Query`] and the reactive
//! adapters in [`crate::reactive`].
//!
//! Every box carries its own reader/writer lock. Change observers are invoked
//! after a mutation commits and outside the data lock, so an observer may
//! immediately run a query against the same box.

pub mod query;

pub use query::{JoinedQuery, LiveQuery, Query, QueryBuilder};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use fishit_model::{CanonicalKey, CanonicalMedia, ResumeMark, SourceType};
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;

use crate::error::{StoreError, StoreResult};

/// Record type stored in an [`EntityBox`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Key: Clone + Ord + fmt::Debug + Send + Sync + 'static;

    fn key(&self) -> &Self::Key;
}

impl Entity for CanonicalMedia {
    type Key = CanonicalKey;

    fn key(&self) -> &CanonicalKey {
        &self.canonical_key
    }
}

impl Entity for ResumeMark {
    type Key = CanonicalKey;

    fn key(&self) -> &CanonicalKey {
        &self.canonical_key
    }
}

/// Callback fired after each committed mutation of a box.
pub type ChangeObserver = Arc<dyn Fn() + Send + Sync>;

/// Guard for a registered change observer.
///
/// Cancelling (explicitly or by dropping the guard) detaches the observer.
/// The cancel action runs at most once.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Keyed storage for one entity type.
pub struct EntityBox<T: Entity> {
    name: &'static str,
    entries: RwLock<BTreeMap<T::Key, T>>,
    observers: Mutex<BTreeMap<u64, ChangeObserver>>,
    next_observer_id: AtomicU64,
    closed: Arc<AtomicBool>,
}

impl<T: Entity> fmt::Debug for EntityBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityBox")
            .field("name", &self.name)
            .field("len", &self.entries.read().len())
            .field("observers", &self.observers.lock().len())
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl<T: Entity> EntityBox<T> {
    pub fn new(name: &'static str, closed: Arc<AtomicBool>) -> Self {
        Self {
            name,
            entries: RwLock::new(BTreeMap::new()),
            observers: Mutex::new(BTreeMap::new()),
            next_observer_id: AtomicU64::new(0),
            closed,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    /// Insert or replace by key.
    pub fn put(&self, entity: T) -> StoreResult<()> {
        self.ensure_open()?;
        self.entries.write().insert(entity.key().clone(), entity);
        self.notify();
        Ok(())
    }

    /// Insert or replace a batch in one transaction; observers fire once.
    pub fn put_many(
        &self,
        entities: impl IntoIterator<Item = T>,
    ) -> StoreResult<usize> {
        self.ensure_open()?;
        let written = {
            let mut entries = self.entries.write();
            let mut written = 0;
            for entity in entities {
                entries.insert(entity.key().clone(), entity);
                written += 1;
            }
            written
        };
        if written > 0 {
            self.notify();
        }
        Ok(written)
    }

    pub fn remove(&self, key: &T::Key) -> StoreResult<Option<T>> {
        self.ensure_open()?;
        let removed = self.entries.write().remove(key);
        if removed.is_some() {
            self.notify();
        }
        Ok(removed)
    }

    pub fn get(&self, key: &T::Key) -> StoreResult<Option<T>> {
        self.ensure_open()?;
        Ok(self.entries.read().get(key).cloned())
    }

    /// Batch point lookup. Results follow the order of `keys`; missing keys
    /// are skipped.
    pub fn get_many(&self, keys: &[T::Key]) -> StoreResult<Vec<T>> {
        self.ensure_open()?;
        let entries = self.entries.read();
        Ok(keys.iter().filter_map(|key| entries.get(key).cloned()).collect())
    }

    /// All entities in key order.
    pub fn all(&self) -> StoreResult<Vec<T>> {
        self.ensure_open()?;
        Ok(self.entries.read().values().cloned().collect())
    }

    pub fn count(&self) -> StoreResult<usize> {
        self.ensure_open()?;
        Ok(self.entries.read().len())
    }

    pub fn query(self: &Arc<Self>) -> QueryBuilder<T> {
        QueryBuilder::new(Arc::clone(self))
    }

    /// Register a change observer. The observer stays attached until the
    /// returned [`Subscription`] is cancelled or dropped.
    pub fn observe(self: &Arc<Self>, observer: ChangeObserver) -> Subscription {
        let id = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        self.observers.lock().insert(id, observer);
        log::trace!("{}: observer {} attached", self.name, id);

        let weak: Weak<Self> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(entity_box) = weak.upgrade() {
                entity_box.observers.lock().remove(&id);
                log::trace!("{}: observer {} detached", entity_box.name, id);
            }
        })
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    fn notify(&self) {
        // Snapshot so observers can re-enter the box (or cancel themselves)
        let observers: Vec<ChangeObserver> =
            self.observers.lock().values().cloned().collect();
        for observer in observers {
            observer();
        }
    }
}

/// Serialized seed data for a store, as produced by the sync pipeline's
/// export or hand-written for demos.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreFixture {
    #[serde(default)]
    pub media: Vec<CanonicalMedia>,
    #[serde(default)]
    pub resume_marks: Vec<ResumeMark>,
}

impl StoreFixture {
    pub fn from_json(raw: &str) -> StoreResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| StoreError::Fixture(err.to_string()))
    }
}

/// The local object store: canonical media and resume marks.
#[derive(Debug)]
pub struct ObjectStore {
    media: Arc<EntityBox<CanonicalMedia>>,
    resume_marks: Arc<EntityBox<ResumeMark>>,
    closed: Arc<AtomicBool>,
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore {
    pub fn new() -> Self {
        let closed = Arc::new(AtomicBool::new(false));
        Self {
            media: Arc::new(EntityBox::new(
                "canonical_media",
                Arc::clone(&closed),
            )),
            resume_marks: Arc::new(EntityBox::new(
                "resume_marks",
                Arc::clone(&closed),
            )),
            closed,
        }
    }

    pub fn media(&self) -> &Arc<EntityBox<CanonicalMedia>> {
        &self.media
    }

    pub fn resume_marks(&self) -> &Arc<EntityBox<ResumeMark>> {
        &self.resume_marks
    }

    /// Close the store. Every later read or write fails with
    /// [`StoreError::Closed`].
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            log::info!("ObjectStore closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Upsert the resume mark for a playback position.
    pub fn record_progress(
        &self,
        canonical_key: CanonicalKey,
        position_ms: i64,
        duration_ms: i64,
        source: Option<SourceType>,
    ) -> StoreResult<ResumeMark> {
        let mark = ResumeMark::from_position(
            canonical_key,
            position_ms,
            duration_ms,
            source,
            chrono::Utc::now().timestamp_millis(),
        )?;
        log::debug!(
            "Recording progress for {}: {:.1}% (completed: {})",
            mark.canonical_key,
            mark.position_percent,
            mark.is_completed
        );
        self.resume_marks.put(mark.clone())?;
        Ok(mark)
    }

    pub fn load_fixture(&self, fixture: StoreFixture) -> StoreResult<()> {
        let media = self.media.put_many(fixture.media)?;
        let marks = self.resume_marks.put_many(fixture.resume_marks)?;
        log::info!(
            "Loaded fixture: {} media items, {} resume marks",
            media,
            marks
        );
        Ok(())
    }
}

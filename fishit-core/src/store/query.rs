use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::{ChangeObserver, Entity, EntityBox, Subscription};
use crate::error::StoreResult;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A query that can be re-run whenever its source changes.
///
/// [`crate::reactive::query_stream`] turns any implementor into a stream of
/// snapshots.
pub trait LiveQuery: Send + Sync + 'static {
    type Item: Send + 'static;

    fn find(&self) -> StoreResult<Vec<Self::Item>>;

    /// Attach `observer` to whatever this query reads from.
    fn observe(&self, observer: ChangeObserver) -> Subscription;
}

/// Builder for [`Query`].
pub struct QueryBuilder<T: Entity> {
    entity_box: Arc<EntityBox<T>>,
    filters: Vec<Predicate<T>>,
    order: Option<Comparator<T>>,
    keys: Option<BTreeSet<T::Key>>,
    limit: Option<usize>,
}

impl<T: Entity> fmt::Debug for QueryBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("box", &self.entity_box.name())
            .field("filters", &self.filters.len())
            .field("ordered", &self.order.is_some())
            .field("keys", &self.keys.as_ref().map(BTreeSet::len))
            .field("limit", &self.limit)
            .finish()
    }
}

impl<T: Entity> QueryBuilder<T> {
    pub(crate) fn new(entity_box: Arc<EntityBox<T>>) -> Self {
        Self {
            entity_box,
            filters: Vec::new(),
            order: None,
            keys: None,
            limit: None,
        }
    }

    /// Keep entities matching `predicate`. Multiple filters are AND-ed.
    pub fn filter(
        mut self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filters.push(Arc::new(predicate));
        self
    }

    pub fn order_by(
        mut self,
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.order = Some(Arc::new(comparator));
        self
    }

    pub fn order_desc_by<K: Ord>(
        self,
        key: impl Fn(&T) -> K + Send + Sync + 'static,
    ) -> Self {
        self.order_by(move |a, b| key(b).cmp(&key(a)))
    }

    pub fn order_asc_by<K: Ord>(
        self,
        key: impl Fn(&T) -> K + Send + Sync + 'static,
    ) -> Self {
        self.order_by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Restrict the query to the given keys (an IN clause).
    pub fn key_in(mut self, keys: impl IntoIterator<Item = T::Key>) -> Self {
        self.keys = Some(keys.into_iter().collect());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self) -> Query<T> {
        Query {
            entity_box: self.entity_box,
            filters: self.filters,
            order: self.order,
            keys: self.keys,
            limit: self.limit,
        }
    }
}

/// Compiled query over one [`EntityBox`].
///
/// Entities are visited in key order before sorting and the sort is stable,
/// so ties on the ordering comparator are broken by key.
pub struct Query<T: Entity> {
    entity_box: Arc<EntityBox<T>>,
    filters: Vec<Predicate<T>>,
    order: Option<Comparator<T>>,
    keys: Option<BTreeSet<T::Key>>,
    limit: Option<usize>,
}

impl<T: Entity> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            entity_box: Arc::clone(&self.entity_box),
            filters: self.filters.clone(),
            order: self.order.clone(),
            keys: self.keys.clone(),
            limit: self.limit,
        }
    }
}

impl<T: Entity> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("box", &self.entity_box.name())
            .field("filters", &self.filters.len())
            .field("ordered", &self.order.is_some())
            .field("keys", &self.keys.as_ref().map(BTreeSet::len))
            .field("limit", &self.limit)
            .finish()
    }
}

impl<T: Entity> Query<T> {
    pub fn find(&self) -> StoreResult<Vec<T>> {
        self.entity_box.ensure_open()?;
        if self.limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut results: Vec<T> = {
            let entries = self.entity_box.entries.read();
            match &self.keys {
                Some(keys) => keys
                    .iter()
                    .filter_map(|key| entries.get(key))
                    .filter(|entity| self.matches(entity))
                    .cloned()
                    .collect(),
                None => entries
                    .values()
                    .filter(|entity| self.matches(entity))
                    .cloned()
                    .collect(),
            }
        };

        if let Some(order) = &self.order {
            results.sort_by(|a, b| order(a, b));
        }
        if let Some(limit) = self.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    pub fn find_first(&self) -> StoreResult<Option<T>> {
        Ok(self.find()?.into_iter().next())
    }

    pub fn count(&self) -> StoreResult<usize> {
        Ok(self.find()?.len())
    }

    fn matches(&self, entity: &T) -> bool {
        self.filters.iter().all(|predicate| predicate(entity))
    }
}

impl<T: Entity> LiveQuery for Query<T> {
    type Item = T;

    fn find(&self) -> StoreResult<Vec<T>> {
        Query::find(self)
    }

    fn observe(&self, observer: ChangeObserver) -> Subscription {
        self.entity_box.observe(observer)
    }
}

impl<T: Entity> Query<T> {
    /// Also re-run when `joined` changes. For rows whose results are later
    /// joined against another box.
    pub fn also_observing<U: Entity>(
        self,
        joined: &Arc<EntityBox<U>>,
    ) -> JoinedQuery<T, U> {
        JoinedQuery {
            query: self,
            joined: Arc::clone(joined),
        }
    }
}

/// [`Query`] whose observers fire on changes to a second box as well.
pub struct JoinedQuery<T: Entity, U: Entity> {
    query: Query<T>,
    joined: Arc<EntityBox<U>>,
}

impl<T: Entity, U: Entity> fmt::Debug for JoinedQuery<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinedQuery")
            .field("query", &self.query)
            .field("joined", &self.joined.name())
            .finish()
    }
}

impl<T: Entity, U: Entity> LiveQuery for JoinedQuery<T, U> {
    type Item = T;

    fn find(&self) -> StoreResult<Vec<T>> {
        self.query.find()
    }

    fn observe(&self, observer: ChangeObserver) -> Subscription {
        let primary = self.query.entity_box.observe(Arc::clone(&observer));
        let joined = self.joined.observe(observer);
        Subscription::new(move || {
            drop(primary);
            drop(joined);
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::StoreError;
    use crate::store::{LiveQuery, ObjectStore};
    use fishit_model::{CanonicalKey, CanonicalMedia, MediaKind, ResumeMark};

    fn mark(key: &str, percent: f32, updated_at: i64) -> ResumeMark {
        ResumeMark {
            canonical_key: CanonicalKey::new(key).unwrap(),
            position_percent: percent,
            position_ms: (percent * 1000.0) as i64,
            duration_ms: 100_000,
            is_completed: percent >= 95.0,
            last_source_type: None,
            updated_at,
        }
    }

    fn keys(marks: &[ResumeMark]) -> Vec<&str> {
        marks.iter().map(|m| m.canonical_key.as_str()).collect()
    }

    fn seeded() -> ObjectStore {
        let store = ObjectStore::new();
        store
            .resume_marks()
            .put_many(vec![
                mark("a", 10.0, 300),
                mark("b", 0.0, 500),
                mark("c", 50.0, 100),
                mark("d", 99.0, 400),
                mark("e", 20.0, 200),
            ])
            .unwrap();
        store
    }

    #[test]
    fn filter_order_and_limit_compose() {
        let store = seeded();
        let query = store
            .resume_marks()
            .query()
            .filter(ResumeMark::is_active)
            .order_desc_by(|m| m.updated_at)
            .limit(2)
            .build();

        let found = query.find().unwrap();
        assert_eq!(keys(&found), vec!["a", "e"]);
    }

    #[test]
    fn unordered_query_returns_key_order() {
        let store = seeded();
        let found = store.resume_marks().query().build().find().unwrap();
        assert_eq!(keys(&found), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn ties_break_by_key() {
        let store = ObjectStore::new();
        store
            .resume_marks()
            .put_many(vec![
                mark("z", 10.0, 1),
                mark("m", 10.0, 1),
                mark("a", 10.0, 1),
            ])
            .unwrap();
        let found = store
            .resume_marks()
            .query()
            .order_desc_by(|m| m.updated_at)
            .build()
            .find()
            .unwrap();
        assert_eq!(keys(&found), vec!["a", "m", "z"]);
    }

    #[test]
    fn key_in_restricts_and_ignores_missing_keys() {
        let store = seeded();
        let wanted = ["c", "a", "nope"]
            .iter()
            .map(|k| CanonicalKey::new(*k).unwrap());
        let found = store
            .resume_marks()
            .query()
            .key_in(wanted)
            .build()
            .find()
            .unwrap();
        assert_eq!(keys(&found), vec!["a", "c"]);
    }

    #[test]
    fn find_first_and_count() {
        let store = seeded();
        let query = store
            .resume_marks()
            .query()
            .order_asc_by(|m| m.updated_at)
            .build();
        assert_eq!(
            query.find_first().unwrap().unwrap().canonical_key.as_str(),
            "c"
        );
        assert_eq!(query.count().unwrap(), 5);

        let empty = store.resume_marks().query().limit(0).build();
        assert_eq!(empty.find_first().unwrap(), None);
    }

    #[test]
    fn joined_query_observes_both_boxes_until_cancelled() {
        let store = seeded();
        let fired = Arc::new(AtomicUsize::new(0));
        let query = store
            .resume_marks()
            .query()
            .filter(ResumeMark::is_active)
            .build()
            .also_observing(store.media());

        let counter = Arc::clone(&fired);
        let mut subscription = LiveQuery::observe(
            &query,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(store.resume_marks().observer_count(), 1);
        assert_eq!(store.media().observer_count(), 1);

        store.resume_marks().put(mark("f", 30.0, 600)).unwrap();
        store
            .media()
            .put(CanonicalMedia::new(
                CanonicalKey::new("movie:f").unwrap(),
                "F",
                MediaKind::Movie,
                1,
            ))
            .unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert_eq!(LiveQuery::find(&query).unwrap().len(), 4);

        subscription.cancel();
        assert_eq!(store.resume_marks().observer_count(), 0);
        assert_eq!(store.media().observer_count(), 0);
        store
            .resume_marks()
            .remove(&CanonicalKey::new("f").unwrap())
            .unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn queries_fail_after_close() {
        let store = seeded();
        let query = store.resume_marks().query().build();
        store.close();
        assert_eq!(query.find(), Err(StoreError::Closed));
    }
}

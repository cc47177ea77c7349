//! Query-to-stream adapter
//!
//! Bridges the store's push-style change observers to pull-style
//! [`Stream`]s. The observer is attached on first poll and detached when the
//! stream is dropped, on every exit path, through the [`Subscription`] guard
//! held inside the generator.

use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use tokio::sync::mpsc;

use crate::error::{StoreError, StoreResult};
use crate::store::{LiveQuery, Subscription};

/// Run `query` on the blocking pool.
pub async fn find_off_thread<Q: LiveQuery>(
    query: &Arc<Q>,
) -> StoreResult<Vec<Q::Item>> {
    let query = Arc::clone(query);
    tokio::task::spawn_blocking(move || query.find())
        .await
        .map_err(|err| StoreError::Task(err.to_string()))?
}

/// Stream of result snapshots for `query`.
///
/// Emits the current result immediately, then a recomputed result after
/// changes. Notifications that arrive before the next recompute starts are
/// merged, so a burst of writes costs one query rather than one per write,
/// and the last snapshot always reflects the final state. The stream only
/// ends when the underlying observer source goes away; dropping it cancels
/// the observer exactly once.
pub fn query_stream<Q: LiveQuery>(
    query: Arc<Q>,
) -> BoxStream<'static, StoreResult<Vec<Q::Item>>> {
    async_stream::stream! {
        // One pending wakeup is enough; a full slot already covers this one
        let (tx, mut rx) = mpsc::channel::<()>(1);
        let _subscription: Subscription = query.observe(Arc::new(move || {
            let _ = tx.try_send(());
        }));

        // Native observers do not fire on registration
        yield find_off_thread(&query).await;

        while rx.recv().await.is_some() {
            yield find_off_thread(&query).await;
        }
    }
    .boxed()
}

/// Like [`query_stream`] but yields only the first result, or `None`.
pub fn query_first_stream<Q: LiveQuery>(
    query: Arc<Q>,
) -> BoxStream<'static, StoreResult<Option<Q::Item>>> {
    query_stream(query)
        .map(|result| result.map(|items| items.into_iter().next()))
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChangeObserver, ObjectStore};
    use fishit_model::{CanonicalKey, CanonicalMedia, MediaKind};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Hand-driven query: tests push results and fire the observer.
    #[derive(Default)]
    struct FakeQuery {
        results: Mutex<Vec<u32>>,
        observer: Mutex<Option<ChangeObserver>>,
        observe_calls: AtomicUsize,
        cancel_calls: Arc<AtomicUsize>,
    }

    impl FakeQuery {
        fn set(&self, results: Vec<u32>) {
            *self.results.lock() = results;
            let observer = self.observer.lock().clone();
            if let Some(observer) = observer {
                observer();
            }
        }
    }

    impl LiveQuery for FakeQuery {
        type Item = u32;

        fn find(&self) -> StoreResult<Vec<u32>> {
            Ok(self.results.lock().clone())
        }

        fn observe(&self, observer: ChangeObserver) -> Subscription {
            self.observe_calls.fetch_add(1, Ordering::SeqCst);
            *self.observer.lock() = Some(observer);
            let cancels = Arc::clone(&self.cancel_calls);
            Subscription::new(move || {
                cancels.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn emits_initial_snapshot_then_changes() {
        let query = Arc::new(FakeQuery::default());
        query.set(vec![1]);
        let mut stream = query_stream(Arc::clone(&query));

        assert_eq!(stream.next().await, Some(Ok(vec![1])));
        query.set(vec![1, 2]);
        assert_eq!(stream.next().await, Some(Ok(vec![1, 2])));
        query.set(vec![]);
        assert_eq!(stream.next().await, Some(Ok(vec![])));
    }

    #[tokio::test]
    async fn dropping_the_stream_cancels_observer_exactly_once() {
        let query = Arc::new(FakeQuery::default());
        let mut stream = query_stream(Arc::clone(&query));
        let _ = stream.next().await;

        assert_eq!(query.observe_calls.load(Ordering::SeqCst), 1);
        assert_eq!(query.cancel_calls.load(Ordering::SeqCst), 0);

        drop(stream);
        assert_eq!(query.cancel_calls.load(Ordering::SeqCst), 1);

        // Late notifications go nowhere
        query.set(vec![9]);
        assert_eq!(query.cancel_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unpolled_stream_never_observes() {
        let query = Arc::new(FakeQuery::default());
        let stream = query_stream(Arc::clone(&query));
        drop(stream);
        assert_eq!(query.observe_calls.load(Ordering::SeqCst), 0);
        assert_eq!(query.cancel_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_query_stream_tracks_box_and_detaches() {
        let store = ObjectStore::new();
        let query = Arc::new(
            store
                .media()
                .query()
                .order_desc_by(|m| m.created_at)
                .build(),
        );
        let mut stream = query_stream(query);

        let first = stream.next().await.unwrap().unwrap();
        assert!(first.is_empty());
        assert_eq!(store.media().observer_count(), 1);

        store
            .media()
            .put(CanonicalMedia::new(
                CanonicalKey::new("movie:alien").unwrap(),
                "Alien",
                MediaKind::Movie,
                10,
            ))
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("emission after put")
            .unwrap()
            .unwrap();
        assert_eq!(second.len(), 1);

        drop(stream);
        assert_eq!(store.media().observer_count(), 0);
    }

    #[tokio::test]
    async fn notification_bursts_merge_into_one_snapshot() {
        let query = Arc::new(FakeQuery::default());
        let mut stream = query_stream(Arc::clone(&query));
        assert_eq!(stream.next().await, Some(Ok(vec![])));

        for i in 0..100 {
            query.set((0..=i).collect());
        }

        let latest = stream.next().await.unwrap().unwrap();
        assert_eq!(latest.len(), 100);
        let idle =
            tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(idle.is_err(), "burst should not queue further snapshots");
    }

    #[tokio::test]
    async fn store_write_burst_is_bounded_and_ends_on_final_state() {
        let store = ObjectStore::new();
        let query = Arc::new(store.media().query().build());
        let mut stream = query_stream(query);
        assert!(stream.next().await.unwrap().unwrap().is_empty());

        for i in 0..500 {
            store
                .media()
                .put(CanonicalMedia::new(
                    CanonicalKey::new(format!("movie:m{i:03}")).unwrap(),
                    "Burst",
                    MediaKind::Movie,
                    i,
                ))
                .unwrap();
        }

        let mut snapshots = 0;
        let mut last = Vec::new();
        while let Ok(Some(next)) =
            tokio::time::timeout(Duration::from_millis(100), stream.next())
                .await
        {
            snapshots += 1;
            last = next.unwrap();
        }
        assert_eq!(snapshots, 1);
        assert_eq!(last.len(), 500);
    }

    #[tokio::test]
    async fn errors_are_emitted_not_swallowed() {
        let store = ObjectStore::new();
        let query = Arc::new(store.media().query().build());
        store.close();

        let mut stream = query_stream(query);
        assert_eq!(stream.next().await, Some(Err(StoreError::Closed)));
    }

    #[tokio::test]
    async fn first_stream_yields_head_or_none() {
        let query = Arc::new(FakeQuery::default());
        let mut stream = query_first_stream(Arc::clone(&query));

        assert_eq!(stream.next().await, Some(Ok(None)));
        query.set(vec![7, 8]);
        assert_eq!(stream.next().await, Some(Ok(Some(7))));
    }
}

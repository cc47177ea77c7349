//! Home content rows backed by the object store.
//!
//! Each row is a live stream that re-emits whenever the boxes it reads
//! change. Store failures never reach the UI: the affected emission becomes
//! an empty row and the stream keeps running, so the next change retries.

use std::collections::HashMap;
use std::sync::Arc;

use fishit_model::{
    CanonicalKey, CanonicalMedia, MediaKind, ResumeMark, SourceType,
};
use futures::stream::{BoxStream, StreamExt};

use crate::config::HomeContentConfig;
use crate::error::StoreResult;
use crate::home::types::HomeMediaItem;
use crate::reactive::{find_off_thread, query_stream};
use crate::store::{EntityBox, ObjectStore};

/// Live stream of one home row.
pub type HomeRow = BoxStream<'static, Vec<HomeMediaItem>>;

/// Source of the six home rows.
pub trait HomeContentRepository: Send + Sync {
    fn observe_continue_watching(&self) -> HomeRow;

    fn observe_recently_added(&self) -> HomeRow;

    fn observe_telegram_media(&self) -> HomeRow;

    fn observe_xtream_live(&self) -> HomeRow;

    fn observe_xtream_vod(&self) -> HomeRow;

    fn observe_xtream_series(&self) -> HomeRow;
}

#[derive(Debug, Clone)]
pub struct ObjectStoreHomeRepository {
    store: Arc<ObjectStore>,
    config: HomeContentConfig,
}

impl ObjectStoreHomeRepository {
    pub fn new(store: Arc<ObjectStore>, config: HomeContentConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &HomeContentConfig {
        &self.config
    }

    fn observe_catalog(
        &self,
        row: &'static str,
        source: SourceType,
        kind: Option<MediaKind>,
    ) -> HomeRow {
        let query = self
            .store
            .media()
            .query()
            .filter(move |media| {
                media.has_source(source)
                    && kind.is_none_or(|kind| media.kind == kind)
            })
            .order_desc_by(|media| media.created_at)
            .limit(self.config.catalog_limit)
            .build();
        let window_ms = self.config.new_item_window_ms();

        query_stream(Arc::new(query))
            .map(move |result| {
                let new_since = new_since_ms(window_ms);
                rows_or_empty(row, result)
                    .iter()
                    .map(|media| {
                        HomeMediaItem::pinned_to(media, source, new_since)
                    })
                    .collect()
            })
            .boxed()
    }
}

impl HomeContentRepository for ObjectStoreHomeRepository {
    /// Active resume marks joined against canonical media with a single
    /// batch lookup per emission. Output keeps resume recency order; marks
    /// whose media is gone are dropped. Changes to either box re-run the
    /// join.
    fn observe_continue_watching(&self) -> HomeRow {
        let query = self
            .store
            .resume_marks()
            .query()
            .filter(ResumeMark::is_active)
            .order_desc_by(|mark| mark.updated_at)
            .limit(self.config.continue_watching_limit)
            .build()
            .also_observing(self.store.media());
        let media_box = Arc::clone(self.store.media());
        let window_ms = self.config.new_item_window_ms();

        query_stream(Arc::new(query))
            .then(move |result| {
                let media_box = Arc::clone(&media_box);
                async move {
                    let marks = rows_or_empty("continue_watching", result);
                    if marks.is_empty() {
                        return Vec::new();
                    }
                    let joined =
                        join_resume_marks(&media_box, marks, window_ms).await;
                    rows_or_empty("continue_watching", joined)
                }
            })
            .boxed()
    }

    fn observe_recently_added(&self) -> HomeRow {
        let query = self
            .store
            .media()
            .query()
            .order_desc_by(|media| media.created_at)
            .limit(self.config.recently_added_limit)
            .build();
        let window_ms = self.config.new_item_window_ms();

        query_stream(Arc::new(query))
            .map(move |result| {
                let new_since = new_since_ms(window_ms);
                rows_or_empty("recently_added", result)
                    .iter()
                    .map(|media| HomeMediaItem::from_media(media, new_since))
                    .collect()
            })
            .boxed()
    }

    fn observe_telegram_media(&self) -> HomeRow {
        self.observe_catalog("telegram_media", SourceType::Telegram, None)
    }

    fn observe_xtream_live(&self) -> HomeRow {
        self.observe_catalog(
            "xtream_live",
            SourceType::Xtream,
            Some(MediaKind::Live),
        )
    }

    fn observe_xtream_vod(&self) -> HomeRow {
        self.observe_catalog(
            "xtream_vod",
            SourceType::Xtream,
            Some(MediaKind::Movie),
        )
    }

    fn observe_xtream_series(&self) -> HomeRow {
        self.observe_catalog(
            "xtream_series",
            SourceType::Xtream,
            Some(MediaKind::Series),
        )
    }
}

async fn join_resume_marks(
    media_box: &Arc<EntityBox<CanonicalMedia>>,
    marks: Vec<ResumeMark>,
    window_ms: i64,
) -> StoreResult<Vec<HomeMediaItem>> {
    let keys: Vec<CanonicalKey> =
        marks.iter().map(|mark| mark.canonical_key.clone()).collect();
    let lookup = Arc::new(media_box.query().key_in(keys).build());
    let by_key: HashMap<CanonicalKey, CanonicalMedia> =
        find_off_thread(&lookup)
            .await?
            .into_iter()
            .map(|media| (media.canonical_key.clone(), media))
            .collect();

    let new_since = new_since_ms(window_ms);
    let items: Vec<HomeMediaItem> = marks
        .iter()
        .filter_map(|mark| {
            by_key
                .get(&mark.canonical_key)
                .map(|media| HomeMediaItem::resumed(media, mark, new_since))
        })
        .collect();

    if items.len() < marks.len() {
        log::debug!(
            "continue_watching: dropped {} resume marks without canonical media",
            marks.len() - items.len()
        );
    }
    Ok(items)
}

fn rows_or_empty<T>(row: &str, result: StoreResult<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|err| {
        log::warn!("{row}: store query failed, showing empty row: {err}");
        Vec::new()
    })
}

fn new_since_ms(window_ms: i64) -> i64 {
    chrono::Utc::now().timestamp_millis().saturating_sub(window_ms)
}

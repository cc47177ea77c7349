#![allow(dead_code)]

use std::time::Duration;

use fishit_core::home::{HomeMediaItem, HomeRow};
use fishit_model::{
    CanonicalKey, CanonicalMedia, MediaKind, MediaSourceRef, ResumeMark,
};
use futures::StreamExt;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn key(raw: &str) -> CanonicalKey {
    CanonicalKey::new(raw).expect("test key")
}

pub fn media(
    raw_key: &str,
    kind: MediaKind,
    created_at: i64,
    sources: &[(&str, &str)],
) -> CanonicalMedia {
    sources.iter().fold(
        CanonicalMedia::new(key(raw_key), raw_key, kind, created_at),
        |media, (source_type, source_id)| {
            media.with_source(MediaSourceRef::new(*source_type, *source_id))
        },
    )
}

pub fn movie(raw_key: &str, created_at: i64) -> CanonicalMedia {
    media(raw_key, MediaKind::Movie, created_at, &[("IO", raw_key)])
}

/// Mark with `percent` progress through a 100 second item.
pub fn mark(raw_key: &str, percent: i64, updated_at: i64) -> ResumeMark {
    ResumeMark::from_position(
        key(raw_key),
        percent * 1_000,
        100_000,
        None,
        updated_at,
    )
    .expect("valid test mark")
}

pub async fn next_row(row: &mut HomeRow) -> Vec<HomeMediaItem> {
    tokio::time::timeout(Duration::from_secs(2), row.next())
        .await
        .expect("row should emit")
        .expect("row stream ended")
}

pub fn keys(items: &[HomeMediaItem]) -> Vec<&str> {
    items.iter().map(|item| item.canonical_key.as_str()).collect()
}

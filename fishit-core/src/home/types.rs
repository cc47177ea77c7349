use fishit_model::{
    CanonicalKey, CanonicalMedia, MediaKind, MediaSourceRef, ResumeMark,
    SourceType,
};

/// One tile in a home row.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeMediaItem {
    pub canonical_key: CanonicalKey,
    pub title: String,
    pub kind: MediaKind,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub year: Option<u16>,
    /// Backend the detail/playback screen routes to
    pub navigation_source: SourceType,
    /// Backend-specific id for `navigation_source`, when one is linked
    pub navigation_id: Option<String>,
    pub resume_position_ms: Option<i64>,
    pub duration_ms: Option<i64>,
    /// 0.0..=1.0, only set for items with a resume mark
    pub progress: Option<f32>,
    pub is_new: bool,
    pub created_at: i64,
}

impl HomeMediaItem {
    /// Item routed by source priority (`Xtream > Telegram > Io`).
    pub fn from_media(media: &CanonicalMedia, new_since_ms: i64) -> Self {
        Self::with_navigation(media, media.navigation_ref(), new_since_ms)
    }

    /// Item routed to a specific backend, as used by per-source rows.
    pub fn pinned_to(
        media: &CanonicalMedia,
        source: SourceType,
        new_since_ms: i64,
    ) -> Self {
        match media.source_ref(source) {
            Some(source_ref) => {
                Self::with_navigation(media, Some(source_ref), new_since_ms)
            }
            None => Self::from_media(media, new_since_ms),
        }
    }

    /// Continue-watching item: routes to the backend playback last used
    /// when the media still links to it, otherwise by source priority.
    pub fn resumed(
        media: &CanonicalMedia,
        mark: &ResumeMark,
        new_since_ms: i64,
    ) -> Self {
        let mut item = match mark.last_source().filter(|s| s.is_known()) {
            Some(source) => Self::pinned_to(media, source, new_since_ms),
            None => Self::from_media(media, new_since_ms),
        };
        item.resume_position_ms = Some(mark.position_ms);
        item.duration_ms = Some(mark.duration_ms);
        item.progress = Some(mark.progress_fraction());
        item
    }

    fn with_navigation(
        media: &CanonicalMedia,
        navigation: Option<&MediaSourceRef>,
        new_since_ms: i64,
    ) -> Self {
        Self {
            canonical_key: media.canonical_key.clone(),
            title: media.title.clone(),
            kind: media.kind,
            poster: media.poster.clone(),
            backdrop: media.backdrop.clone(),
            year: media.year,
            navigation_source: navigation
                .map(MediaSourceRef::source)
                .unwrap_or(SourceType::Unknown),
            navigation_id: navigation.map(|r| r.source_id.clone()),
            resume_position_ms: None,
            duration_ms: media.duration_ms,
            progress: None,
            is_new: media.created_at >= new_since_ms,
            created_at: media.created_at,
        }
    }
}

/// Stage-one fan-in result: the first four home rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeContentPartial {
    pub continue_watching: Vec<HomeMediaItem>,
    pub recently_added: Vec<HomeMediaItem>,
    pub telegram_media: Vec<HomeMediaItem>,
    pub xtream_live: Vec<HomeMediaItem>,
}

/// Immutable snapshot rendered by the home screen.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeState {
    pub continue_watching: Vec<HomeMediaItem>,
    pub recently_added: Vec<HomeMediaItem>,
    pub telegram_media: Vec<HomeMediaItem>,
    pub xtream_live: Vec<HomeMediaItem>,
    pub xtream_vod: Vec<HomeMediaItem>,
    pub xtream_series: Vec<HomeMediaItem>,
    pub is_loading: bool,
}

impl Default for HomeState {
    fn default() -> Self {
        Self::loading()
    }
}

impl HomeState {
    /// Placeholder shown before the first combined emission.
    pub fn loading() -> Self {
        Self {
            continue_watching: Vec::new(),
            recently_added: Vec::new(),
            telegram_media: Vec::new(),
            xtream_live: Vec::new(),
            xtream_vod: Vec::new(),
            xtream_series: Vec::new(),
            is_loading: true,
        }
    }

    /// Stage-two fan-in: the partial plus the remaining Xtream rows.
    pub fn from_rows(
        partial: HomeContentPartial,
        xtream_vod: Vec<HomeMediaItem>,
        xtream_series: Vec<HomeMediaItem>,
    ) -> Self {
        Self {
            continue_watching: partial.continue_watching,
            recently_added: partial.recently_added,
            telegram_media: partial.telegram_media,
            xtream_live: partial.xtream_live,
            xtream_vod,
            xtream_series,
            is_loading: false,
        }
    }

    pub fn has_telegram_content(&self) -> bool {
        !self.telegram_media.is_empty()
    }

    pub fn has_xtream_content(&self) -> bool {
        !self.xtream_live.is_empty()
            || !self.xtream_vod.is_empty()
            || !self.xtream_series.is_empty()
    }

    pub fn has_content(&self) -> bool {
        !self.continue_watching.is_empty()
            || !self.recently_added.is_empty()
            || self.has_telegram_content()
            || self.has_xtream_content()
    }
}

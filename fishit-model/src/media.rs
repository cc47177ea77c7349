use std::fmt::{Display, Formatter};

use crate::ids::CanonicalKey;
use crate::source::SourceType;

/// Kind of playable item behind a canonical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MediaKind {
    Movie,
    Series,
    Episode,
    Live,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
            MediaKind::Episode => "episode",
            MediaKind::Live => "live",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backlink from a canonical item to one concrete backend record.
///
/// `source_type` keeps the raw persisted string; use
/// [`MediaSourceRef::source`] for the parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaSourceRef {
    pub source_type: String,
    pub source_id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
}

impl MediaSourceRef {
    pub fn new(
        source_type: impl Into<String>,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            source_type: source_type.into(),
            source_id: source_id.into(),
            label: None,
        }
    }

    pub fn source(&self) -> SourceType {
        SourceType::parse(&self.source_type)
    }
}

/// Deduplicated media record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanonicalMedia {
    pub canonical_key: CanonicalKey,
    pub title: String,
    pub kind: MediaKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub poster: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub backdrop: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub year: Option<u16>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_ms: Option<i64>,
    /// Epoch milliseconds when the sync pipeline first stored the item
    pub created_at: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sources: Vec<MediaSourceRef>,
}

impl CanonicalMedia {
    pub fn new(
        canonical_key: CanonicalKey,
        title: impl Into<String>,
        kind: MediaKind,
        created_at: i64,
    ) -> Self {
        Self {
            canonical_key,
            title: title.into(),
            kind,
            poster: None,
            backdrop: None,
            year: None,
            duration_ms: None,
            created_at,
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: MediaSourceRef) -> Self {
        self.sources.push(source);
        self
    }

    pub fn has_source(&self, source: SourceType) -> bool {
        self.source_ref(source).is_some()
    }

    /// First backlink of the given backend, in backlink order.
    pub fn source_ref(&self, source: SourceType) -> Option<&MediaSourceRef> {
        self.sources.iter().find(|r| r.source() == source)
    }

    /// Backlink navigation should route to.
    ///
    /// Picks the highest priority recognised backend
    /// (`Xtream > Telegram > Io`); among backlinks of that backend the first
    /// in backlink order wins. Returns `None` when no backlink is
    /// recognised.
    pub fn navigation_ref(&self) -> Option<&MediaSourceRef> {
        self.sources
            .iter()
            .enumerate()
            .filter(|(_, r)| r.source().is_known())
            .min_by_key(|(idx, r)| (r.source().priority(), *idx))
            .map(|(_, r)| r)
    }

    pub fn navigation_source(&self) -> SourceType {
        self.navigation_ref()
            .map(MediaSourceRef::source)
            .unwrap_or(SourceType::Unknown)
    }
}

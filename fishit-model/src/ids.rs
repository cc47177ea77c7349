use crate::error::{ModelError, Result};
use crate::media::MediaKind;

/// Normalised identity of a logical media item.
///
/// The same movie reachable through Xtream, Telegram and a local file shares
/// one key, so resume marks and home rows deduplicate on it. Keys built with
/// [`CanonicalKey::for_media`] look like `movie:the-matrix:1999`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Wrap an already-normalised key verbatim.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ModelError::InvalidKey(
                "canonical key cannot be empty".to_string(),
            ));
        }
        Ok(CanonicalKey(raw))
    }

    /// Build the key for a title of the given kind.
    pub fn for_media(
        kind: MediaKind,
        title: &str,
        year: Option<u16>,
    ) -> Result<Self> {
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(ModelError::InvalidKey(format!(
                "title {title:?} has no alphanumeric characters"
            )));
        }
        let key = match year {
            Some(year) => format!("{}:{}:{}", kind.as_str(), slug, year),
            None => format!("{}:{}", kind.as_str(), slug),
        };
        Ok(CanonicalKey(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

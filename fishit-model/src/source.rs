use std::fmt::{Display, Formatter};

/// Backend able to serve a canonical media item.
///
/// Declaration order is navigation priority: when an item is reachable
/// through several backends the earliest variant wins. `Unknown` is the
/// sentinel for unrecognised source strings and never routes anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceType {
    Xtream,
    Telegram,
    Io,
    Unknown,
}

impl SourceType {
    pub const ALL: [Self; 4] =
        [Self::Xtream, Self::Telegram, Self::Io, Self::Unknown];

    /// Parse a persisted source type string. Unrecognised values map to
    /// [`SourceType::Unknown`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("xtream") {
            Self::Xtream
        } else if raw.eq_ignore_ascii_case("telegram") {
            Self::Telegram
        } else if raw.eq_ignore_ascii_case("io")
            || raw.eq_ignore_ascii_case("local")
            || raw.eq_ignore_ascii_case("file")
        {
            Self::Io
        } else {
            Self::Unknown
        }
    }

    /// Lower rank routes first.
    pub fn priority(self) -> u8 {
        match self {
            Self::Xtream => 0,
            Self::Telegram => 1,
            Self::Io => 2,
            Self::Unknown => 3,
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xtream => "XTREAM",
            Self::Telegram => "TELEGRAM",
            Self::Io => "IO",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Display for SourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

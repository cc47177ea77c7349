use anyhow::{Context, anyhow};
use fishit_core::{HomeContentConfig, LogBufferConfig};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const CONFIG_PATH_ENV: &str = "FISHIT_CONFIG_PATH";
pub const CONFIG_JSON_ENV: &str = "FISHIT_CONFIG_JSON";

const DEFAULT_FILES: &[&str] =
    &["fishit.toml", "fishit.json", "config/fishit.toml"];

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => f.write_str("built-in defaults"),
            ConfigSource::EnvPath(path) => {
                write!(f, "{} ({CONFIG_PATH_ENV})", path.display())
            }
            ConfigSource::EnvInline => f.write_str(CONFIG_JSON_ENV),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Everything the player reads at startup. Missing sections and fields fall
/// back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Home row caps and the "new" badge window.
    pub home: HomeContentConfig,
    /// In-memory log viewer buffer.
    pub log_buffer: LogBufferConfig,
}

impl PlayerConfig {
    /// Resolve from `$FISHIT_CONFIG_PATH`, then `$FISHIT_CONFIG_JSON`, then
    /// the first default file present in the working directory, then
    /// defaults.
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        Self::load_with(|name| env::var(name).ok(), Self::find_default_file)
    }

    fn load_with(
        lookup: impl Fn(&str) -> Option<String>,
        default_file: impl FnOnce() -> Option<PathBuf>,
    ) -> anyhow::Result<(Self, ConfigSource)> {
        if let Some(path_str) = lookup(CONFIG_PATH_ENV)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = lookup(CONFIG_JSON_ENV)
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_ENV}"))?;
            return Ok((parsed, ConfigSource::EnvInline));
        }

        if let Some(path) = default_file() {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read player config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid player config {}", path.display())
            }),
            Some("toml") => toml::from_str(&contents).map_err(|err| {
                anyhow!("invalid player config {}: {}", path.display(), err)
            }),
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    /// TOML first, then JSON.
    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse player config {origin}: toml error: {toml_err}; json error: {json_err}"
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid player config json: {err}"))
    }

    fn find_default_file() -> Option<PathBuf> {
        DEFAULT_FILES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn write_config(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn toml_file_overrides_only_given_fields() {
        let file = write_config(
            ".toml",
            "[home]\ncontinue_watching_limit = 12\n\n[log_buffer]\nlevel = \"info\"\n",
        );
        let config = PlayerConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.home.continue_watching_limit, 12);
        assert_eq!(config.home.recently_added_limit, 60);
        assert_eq!(config.log_buffer.level, "info");
        assert_eq!(config.log_buffer.capacity, 500);
    }

    #[test]
    fn json_file_is_parsed_by_extension() {
        let file =
            write_config(".json", r#"{"log_buffer": {"capacity": 64}}"#);
        let config = PlayerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.log_buffer.capacity, 64);
    }

    #[test]
    fn unknown_extension_tries_toml_then_json() {
        let config = PlayerConfig::parse_from_str(
            r#"{"home": {"catalog_limit": 5}}"#,
            "inline",
        )
        .unwrap();
        assert_eq!(config.home.catalog_limit, 5);

        let err = PlayerConfig::parse_from_str("home = [", "broken.cfg")
            .unwrap_err()
            .to_string();
        assert!(err.contains("broken.cfg"));
    }

    #[test]
    fn env_path_wins_over_inline_json() {
        let file = write_config(".toml", "[home]\ncatalog_limit = 7\n");
        let path = file.path().to_str().unwrap();
        let (config, source) = PlayerConfig::load_with(
            lookup(&[
                (CONFIG_PATH_ENV, path),
                (CONFIG_JSON_ENV, r#"{"home": {"catalog_limit": 9}}"#),
            ]),
            || None,
        )
        .unwrap();

        assert_eq!(config.home.catalog_limit, 7);
        assert_eq!(source, ConfigSource::EnvPath(file.path().to_path_buf()));
    }

    #[test]
    fn inline_json_then_default_file_then_defaults() {
        let (config, source) = PlayerConfig::load_with(
            lookup(&[(CONFIG_JSON_ENV, r#"{"home": {"catalog_limit": 9}}"#)]),
            || None,
        )
        .unwrap();
        assert_eq!(config.home.catalog_limit, 9);
        assert_eq!(source, ConfigSource::EnvInline);

        let file = write_config(".toml", "[home]\nrecently_added_limit = 3\n");
        let default_path = file.path().to_path_buf();
        let (config, source) = PlayerConfig::load_with(
            lookup(&[(CONFIG_PATH_ENV, "  ")]),
            || Some(default_path.clone()),
        )
        .unwrap();
        assert_eq!(config.home.recently_added_limit, 3);
        assert_eq!(source, ConfigSource::File(default_path));

        let (config, source) =
            PlayerConfig::load_with(lookup(&[]), || None).unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(source, ConfigSource::Default);
    }

    #[test]
    fn invalid_inline_json_is_an_error() {
        let result = PlayerConfig::load_with(
            lookup(&[(CONFIG_JSON_ENV, "{not json")]),
            || None,
        );
        assert!(result.is_err());
    }
}

//! Runner configuration: where checkpoints live and how the runner reports.
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_EXTENSION: &str = "pgs";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory holding `<chain-hex>.<extension>` records. Must already
    /// exist; the runner never creates it.
    pub cache_dir: PathBuf,
    pub extension: String,
    /// Print `Saving state: <path>` / `Loading state from file: <path>` to
    /// stdout for console parity.
    pub announce: bool,
    /// When every stage is skipped, load the final checkpoint so the run
    /// still yields its result.
    pub materialize_cached: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            announce: false,
            materialize_cached: true,
        }
    }
}

impl RunnerConfig {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_announce(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    pub fn with_materialize_cached(mut self, materialize: bool) -> Self {
        self.materialize_cached = materialize;
        self
    }

    /// Defaults overlaid with `PIXICOG_CACHE_DIR`, `PIXICOG_CACHE_EXT`,
    /// `PIXICOG_ANNOUNCE` and `PIXICOG_MATERIALIZE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup("PIXICOG_CACHE_DIR").filter(|v| !v.is_empty()) {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(ext) = lookup("PIXICOG_CACHE_EXT").filter(|v| !v.is_empty()) {
            config.extension = ext;
        }
        if let Some(flag) = lookup("PIXICOG_ANNOUNCE").and_then(|v| parse_flag(&v)) {
            config.announce = flag;
        }
        if let Some(flag) = lookup("PIXICOG_MATERIALIZE").and_then(|v| parse_flag(&v)) {
            config.materialize_cached = flag;
        }
        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub catalog: Catalog,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.to_string_lossy()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Start a session on launch; without one every session-scoped
    /// accessor fails.
    #[serde(default = "yes")]
    pub active: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { active: true }
    }
}

/// Resources served by the in-memory native layer, cross-referenced by uri.
#[derive(Debug, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub tracks: Vec<TrackEntry>,
    #[serde(default)]
    pub albums: Vec<AlbumEntry>,
    #[serde(default)]
    pub artists: Vec<ArtistEntry>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TrackEntry {
    pub uri: String,
    #[serde(default = "yes")]
    pub loaded: bool,
    /// Raw native error code, 0 is OK
    #[serde(default)]
    pub error: i32,
    pub name: Option<String>,
    /// Milliseconds
    pub duration: Option<u32>,
    pub popularity: Option<u32>,
    pub disc: Option<u32>,
    pub index: Option<u32>,
    pub album: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default = "available")]
    pub availability: i32,
    #[serde(default)]
    pub offline_status: i32,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub placeholder: bool,
    /// Uri of the track actually played instead of this one
    pub autolink: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AlbumEntry {
    pub uri: String,
    #[serde(default = "yes")]
    pub loaded: bool,
    #[serde(default = "yes")]
    pub available: bool,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub year: Option<u32>,
    #[serde(default)]
    pub album_type: i32,
}

#[derive(Debug, Deserialize, Default)]
pub struct ArtistEntry {
    pub uri: String,
    #[serde(default = "yes")]
    pub loaded: bool,
    pub name: Option<String>,
}

fn yes() -> bool {
    true
}

fn available() -> i32 {
    1
}

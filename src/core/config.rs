use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::song::Song;

/// Songs skipped by dependency resolution unless the user edits the list
pub const DEFAULT_IGNORED_SONGS: &str = "arcahv,tempestissimo,defection,infinitestrife,worldender,pentiment,arcanaeden,testify,lovelessdress,last,lasteternity,callimakarma,ignotusafterburn,redandblueandgreen,singularityvvvip,overdead,mismal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub minimal_rating: i32,
    #[serde(default = "default_ignored_song")]
    pub ignored_song: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            minimal_rating: 0,
            ignored_song: default_ignored_song(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Parse the comma-delimited `ignoredSong` list
    pub fn ignored_ids(&self) -> HashSet<String> {
        self.ignored_song
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn default_ignored_song() -> String {
    DEFAULT_IGNORED_SONGS.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The currently opened library and a cached copy of its manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetsState {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub songs: Vec<Song>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub assets: AssetsState,
    /// Where this config is persisted; `None` means the per-user default
    #[serde(skip)]
    location: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if !config_path.exists() {
            Config::default()
        } else {
            let data = fs::read(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            if data.is_empty() {
                Config::default()
            } else {
                serde_json::from_slice(&data).unwrap_or_else(|e| {
                    log::warn!("Ignoring unreadable config {:?}: {}", config_path, e);
                    Config::default()
                })
            }
        };

        config.location = Some(config_path.to_path_buf());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = match &self.location {
            Some(path) => path.clone(),
            None => Self::get_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data =
            serde_json::to_vec_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(&config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("aam").join("config.json"))
    }

    /// Library root, if one is open
    pub fn library_path(&self) -> Option<PathBuf> {
        if self.assets.path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.assets.path))
        }
    }
}

/// Keys exposed by the settings store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    MinimalRating,
    IgnoredSong,
    LogLevel,
    AssetsPath,
    AssetsSongs,
}

impl StoreKey {
    pub const ALL: [StoreKey; 5] = [
        StoreKey::MinimalRating,
        StoreKey::IgnoredSong,
        StoreKey::LogLevel,
        StoreKey::AssetsPath,
        StoreKey::AssetsSongs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::MinimalRating => "settings.minimalRating",
            StoreKey::IgnoredSong => "settings.ignoredSong",
            StoreKey::LogLevel => "settings.logLevel",
            StoreKey::AssetsPath => "assets.path",
            StoreKey::AssetsSongs => "assets.songs",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        StoreKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown settings key: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Settings,
    Assets,
}

impl FromStr for Namespace {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "settings" => Ok(Namespace::Settings),
            "assets" => Ok(Namespace::Assets),
            other => Err(anyhow::anyhow!("Unknown settings namespace: {}", other)),
        }
    }
}

/// Key-value view of the settings store
pub trait Store {
    fn get(&self, key: StoreKey) -> Value;
    fn set(&mut self, key: StoreKey, value: Value) -> Result<()>;
    fn reset(&mut self, namespace: Namespace);
}

impl Store for Config {
    fn get(&self, key: StoreKey) -> Value {
        match key {
            StoreKey::MinimalRating => Value::from(self.settings.minimal_rating),
            StoreKey::IgnoredSong => Value::from(self.settings.ignored_song.clone()),
            StoreKey::LogLevel => Value::from(self.settings.log_level.clone()),
            StoreKey::AssetsPath => Value::from(self.assets.path.clone()),
            StoreKey::AssetsSongs => {
                serde_json::to_value(&self.assets.songs).unwrap_or(Value::Null)
            }
        }
    }

    fn set(&mut self, key: StoreKey, value: Value) -> Result<()> {
        match key {
            StoreKey::MinimalRating => {
                self.settings.minimal_rating = serde_json::from_value(value)
                    .with_context(|| format!("{} must be an integer", key))?;
            }
            StoreKey::IgnoredSong => {
                self.settings.ignored_song = serde_json::from_value(value)
                    .with_context(|| format!("{} must be a string", key))?;
            }
            StoreKey::LogLevel => {
                self.settings.log_level = serde_json::from_value(value)
                    .with_context(|| format!("{} must be a string", key))?;
            }
            StoreKey::AssetsPath => {
                self.assets.path = serde_json::from_value(value)
                    .with_context(|| format!("{} must be a string", key))?;
            }
            StoreKey::AssetsSongs => {
                self.assets.songs = serde_json::from_value(value)
                    .with_context(|| format!("{} must be a song array", key))?;
            }
        }
        Ok(())
    }

    fn reset(&mut self, namespace: Namespace) {
        match namespace {
            Namespace::Settings => self.settings = Settings::default(),
            Namespace::Assets => self.assets = AssetsState::default(),
        }
    }
}

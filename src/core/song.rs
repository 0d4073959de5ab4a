//! Song records as stored in a `songlist` manifest
//!
//! Field names follow the on-disk JSON exactly. Fields this crate does not
//! interpret (`purchase`, `audioPreview`, extra locales, ...) are kept in a
//! flattened map so a load/save cycle never drops them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Difficulty tier of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RatingClass {
    Past,
    Present,
    Future,
    Beyond,
}

impl RatingClass {
    pub fn as_u8(self) -> u8 {
        match self {
            RatingClass::Past => 0,
            RatingClass::Present => 1,
            RatingClass::Future => 2,
            RatingClass::Beyond => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RatingClass::Past => "Past",
            RatingClass::Present => "Present",
            RatingClass::Future => "Future",
            RatingClass::Beyond => "Beyond",
        }
    }
}

impl TryFrom<u8> for RatingClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RatingClass::Past),
            1 => Ok(RatingClass::Present),
            2 => Ok(RatingClass::Future),
            3 => Ok(RatingClass::Beyond),
            other => Err(format!("ratingClass must be 0..=3, got {}", other)),
        }
    }
}

impl From<RatingClass> for u8 {
    fn from(class: RatingClass) -> Self {
        class.as_u8()
    }
}

/// Rating classes appear in file names as their numeric value (`3.aff`)
impl fmt::Display for RatingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Thematic side of a song, decides the default background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Side {
    #[default]
    Light,
    Conflict,
    Colorless,
    /// Sides newer than this tool; treated like Colorless
    Other(u8),
}

impl From<u8> for Side {
    fn from(value: u8) -> Self {
        match value {
            0 => Side::Light,
            1 => Side::Conflict,
            2 => Side::Colorless,
            n => Side::Other(n),
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        match side {
            Side::Light => 0,
            Side::Conflict => 1,
            Side::Colorless => 2,
            Side::Other(n) => n,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleLocalized {
    #[serde(default)]
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ja: Option<String>,
    #[serde(flatten)]
    pub others: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDifficulty {
    pub rating_class: RatingClass,
    #[serde(default)]
    pub chart_designer: String,
    #[serde(default)]
    pub jacket_designer: String,
    pub rating: i32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub rating_plus: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub jacket_override: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub audio_override: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SongDifficulty {
    pub fn new(rating_class: RatingClass, rating: i32) -> Self {
        Self {
            rating_class,
            chart_designer: String::new(),
            jacket_designer: String::new(),
            rating,
            rating_plus: false,
            jacket_override: false,
            audio_override: false,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(default)]
    pub idx: i64,
    pub id: String,
    #[serde(default)]
    pub title_localized: TitleLocalized,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub bpm: String,
    #[serde(default)]
    pub bpm_base: f64,
    #[serde(default)]
    pub set: String,
    pub side: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub remote_dl: bool,
    /// Source folder of a linked song; `None` means the library owns the files
    #[serde(rename = "_external", default, skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
    #[serde(default)]
    pub difficulties: Vec<SongDifficulty>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Song {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Background override, ignoring the empty string
    pub fn background(&self) -> Option<&str> {
        self.bg.as_deref().filter(|bg| !bg.is_empty())
    }

    /// Folder name of the song inside `songs/`
    pub fn asset_dir_name(&self) -> String {
        if self.remote_dl {
            format!("dl_{}", self.id)
        } else {
            self.id.clone()
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title_localized.en.is_empty() {
            &self.id
        } else {
            &self.title_localized.en
        }
    }
}

/// On-disk shape of a manifest: `{ "songs": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Songlist {
    pub songs: Vec<Song>,
}

/// A file the installed library must contain, attributed to the song needing it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetDependence {
    /// Path relative to the library root, `/`-separated
    pub dep: String,
    pub source_id: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

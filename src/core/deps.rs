//! Dependency resolution for song folders
//!
//! One policy decides which files a song needs. [`Layout`] decides where
//! those files live: a source folder as distributed by a chart author, or
//! the installed asset tree (with its `dl_` prefix and `img/bg` folder).
//! Both modes go through [`DependencyPolicy::song_files`], so override
//! rules cannot drift apart between import and verification.

use std::collections::HashSet;

use crate::core::config::Settings;
use crate::core::song::{AssetDependence, Side, Song, SongDifficulty};

/// Where the files of one song are laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Flat song folder as shipped by its author
    Source,
    /// `songs/<dir>/` inside an installed library
    Asset { remote_dl: bool, song_dir: String },
}

impl Layout {
    pub fn asset_for(song: &Song) -> Self {
        Layout::Asset {
            remote_dl: song.remote_dl,
            song_dir: song.asset_dir_name(),
        }
    }

    fn remote_dl(&self) -> bool {
        matches!(self, Layout::Asset { remote_dl: true, .. })
    }

    fn path(&self, file: &str) -> String {
        match self {
            Layout::Source => file.to_string(),
            Layout::Asset { song_dir, .. } => format!("songs/{}/{}", song_dir, file),
        }
    }
}

/// Settings-derived rules shared by the importer and the verifier
#[derive(Debug, Clone, Default)]
pub struct DependencyPolicy {
    pub minimal_rating: i32,
    pub ignored: HashSet<String>,
}

impl DependencyPolicy {
    pub fn new(minimal_rating: i32, ignored: HashSet<String>) -> Self {
        Self {
            minimal_rating,
            ignored,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.minimal_rating, settings.ignored_ids())
    }

    /// A difficulty has a chart file when its rating is non-negative and
    /// not below the configured minimum
    pub fn has_chart(&self, diff: &SongDifficulty) -> bool {
        diff.rating >= 0 && diff.rating >= self.minimal_rating
    }

    pub fn is_ignored(&self, song: &Song) -> bool {
        self.ignored.contains(&song.id)
    }

    /// Files an importer must copy out of a source song folder
    pub fn source_deps(&self, song: &Song) -> Vec<String> {
        log::debug!("Resolving source dependencies for {}", song.id);
        self.song_files(song, &Layout::Source)
    }

    /// Files an installed library must contain for `song`
    pub fn asset_deps(&self, song: &Song) -> Vec<AssetDependence> {
        if self.is_ignored(song) {
            log::debug!("Skipping ignored song {}", song.id);
            return Vec::new();
        }
        log::debug!("Resolving asset dependencies for {}", song.id);

        let background = match (song.background(), song.side) {
            (Some(bg), _) => Some(format!("{}.jpg", bg)),
            (None, Side::Light) => Some("base_light.jpg".to_string()),
            (None, Side::Conflict) => Some("base_conflict.jpg".to_string()),
            (None, _) => None,
        };

        background
            .map(|bg| format!("img/bg/{}", bg))
            .into_iter()
            .chain(self.song_files(song, &Layout::asset_for(song)))
            .map(|dep| AssetDependence {
                dep,
                source_id: song.id.clone(),
            })
            .collect()
    }

    /// The shared policy, joined per layout
    ///
    /// Source folders list the base files first, then each difficulty in
    /// array order. Installed assets list every image first, then the audio
    /// and chart block.
    pub fn song_files(&self, song: &Song, layout: &Layout) -> Vec<String> {
        let remote = layout.remote_dl();
        let base_audio = String::from(if remote { "preview.ogg" } else { "base.ogg" });
        let base_images = ["base.jpg".to_string(), "base_256.jpg".to_string()];
        let per_difficulty: Vec<DifficultyFiles> = song
            .difficulties
            .iter()
            .map(|diff| self.difficulty_files(diff, remote))
            .collect();

        let mut files = Vec::new();
        match layout {
            Layout::Source => {
                files.push(base_audio);
                files.extend(base_images);
                for diff in per_difficulty {
                    files.extend(diff.chart);
                    files.extend(diff.jackets.into_iter().flatten());
                    files.extend(diff.audio);
                }
            }
            Layout::Asset { .. } => {
                files.extend(base_images);
                let (jackets, sounds): (Vec<_>, Vec<_>) = per_difficulty
                    .into_iter()
                    .map(|diff| (diff.jackets, (diff.chart, diff.audio)))
                    .unzip();
                files.extend(jackets.into_iter().flatten().flatten());
                files.push(base_audio);
                for (chart, audio) in sounds {
                    files.extend(chart);
                    files.extend(audio);
                }
            }
        }

        files.into_iter().map(|file| layout.path(&file)).collect()
    }

    fn difficulty_files(&self, diff: &SongDifficulty, remote: bool) -> DifficultyFiles {
        let class = diff.rating_class;
        DifficultyFiles {
            chart: (!remote && self.has_chart(diff)).then(|| format!("{}.aff", class)),
            jackets: diff
                .jacket_override
                .then(|| [format!("{}.jpg", class), format!("{}_256.jpg", class)]),
            audio: diff.audio_override.then(|| {
                if remote {
                    format!("{}_preview.ogg", class)
                } else {
                    format!("{}.ogg", class)
                }
            }),
        }
    }
}

/// Files one difficulty adds on top of the base files
struct DifficultyFiles {
    chart: Option<String>,
    jackets: Option<[String; 2]>,
    audio: Option<String>,
}

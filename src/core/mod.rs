// Core business logic module

pub mod config;
pub mod deps;
pub mod importer;
pub mod manifest;
pub mod packager;
pub mod song;
pub mod verifier;

// Re-export commonly used items
pub use config::{Config, Settings, Store, StoreKey};
pub use deps::{DependencyPolicy, Layout};
pub use importer::{import_batch, import_song, ImportOutcome};
pub use manifest::{merge_songlist, ManifestError, ManifestStore};
pub use packager::{PackageEvent, Packager};
pub use song::{AssetDependence, RatingClass, Side, Song, SongDifficulty, Songlist};
pub use verifier::{verify_library, Severity, VerifyReport};

//! Library verification
//!
//! Replays asset-layout dependency resolution for every manifest entry and
//! checks that each required file exists. Only existence is checked.

use std::fmt;
use std::path::Path;

use crate::core::deps::DependencyPolicy;
use crate::core::manifest::ManifestStore;
use crate::core::song::AssetDependence;
use crate::error::Result;

/// A missing Beyond chart is often fetched online, so it only warns
const BEYOND_CHART_SUFFIX: &str = "3.aff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Ok => "ok",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub dependence: AssetDependence,
}

impl Finding {
    pub fn classify(dependence: AssetDependence) -> Self {
        let severity = if dependence.dep.ends_with(BEYOND_CHART_SUFFIX) {
            Severity::Warning
        } else {
            Severity::Error
        };
        Self {
            severity,
            dependence,
        }
    }

    pub fn message(&self) -> String {
        match self.severity {
            Severity::Warning => format!(
                "[W] {} defines a Beyond difficulty but its chart is missing; it may be loaded online.",
                self.dependence.source_id
            ),
            _ => format!(
                "[E] {} requires {}, but it does not exist.",
                self.dependence.source_id, self.dependence.dep
            ),
        }
    }
}

/// Findings in discovery order
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub findings: Vec<Finding>,
    pub songs_checked: usize,
}

impl VerifyReport {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn severity(&self) -> Severity {
        self.findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    /// Human-readable lines
    ///
    /// Each error is put in front of everything found before it, so errors
    /// come out newest first and warnings keep discovery order after them.
    pub fn lines(&self) -> Vec<String> {
        let (errors, warnings): (Vec<&Finding>, Vec<&Finding>) = self
            .findings
            .iter()
            .partition(|f| f.severity == Severity::Error);
        errors
            .into_iter()
            .rev()
            .chain(warnings)
            .map(Finding::message)
            .collect()
    }

    pub fn summary(&self) -> String {
        if self.findings.is_empty() {
            "No dependency problems detected.".to_string()
        } else {
            format!(
                "Detected the following problems, {} of them error(s).",
                self.error_count()
            )
        }
    }
}

/// Check the dependencies of every song in an already opened manifest
pub fn verify_songs(store: &ManifestStore, policy: &DependencyPolicy) -> VerifyReport {
    let library = store.library();
    let mut report = VerifyReport {
        songs_checked: store.songs().len(),
        ..Default::default()
    };

    for song in store.songs() {
        for dependence in policy.asset_deps(song) {
            if !dependency_present(library, &dependence) {
                report.findings.push(Finding::classify(dependence));
            }
        }
    }

    log::info!(
        "Verified {} song(s): {} error(s), {} warning(s)",
        report.songs_checked,
        report.error_count(),
        report.warning_count()
    );
    report
}

/// Load `<library>/songs/songlist` and verify it
pub fn verify_library(library: &Path, policy: &DependencyPolicy) -> Result<VerifyReport> {
    log::info!("Verifying library {:?}", library);
    let store = ManifestStore::open(library)?;
    Ok(verify_songs(&store, policy))
}

fn dependency_present(library: &Path, dependence: &AssetDependence) -> bool {
    let path = library.join(&dependence.dep);
    match path.try_exists() {
        Ok(exists) => exists,
        Err(e) => {
            log::warn!("Could not check {:?}: {}", path, e);
            false
        }
    }
}

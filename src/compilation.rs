//! Per-platform build state derived from a project record.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::CocoonError;
use crate::platform::Platform;

// ═══════════════════════════════════════════════════════════════════════════════
//  Status
// ═══════════════════════════════════════════════════════════════════════════════

/// Lifecycle of a single platform build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Created,
    Waiting,
    Compiling,
    Completed,
    Disabled,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Created => "created",
            Status::Waiting => "waiting",
            Status::Compiling => "compiling",
            Status::Completed => "completed",
            Status::Disabled => "disabled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Status::Created),
            "waiting" => Ok(Status::Waiting),
            "compiling" => Ok(Status::Compiling),
            "completed" => Ok(Status::Completed),
            "disabled" => Ok(Status::Disabled),
            other => Err(format!("Unknown compilation status '{other}'")),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Project record
// ═══════════════════════════════════════════════════════════════════════════════

/// The subset of a project record the tracker reads.  Per-platform maps are
/// keyed by platform wire name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: HashMap<String, String>,
    #[serde(default)]
    pub error: HashMap<String, String>,
    #[serde(default)]
    pub download: HashMap<String, String>,
    /// Platforms whose last build was a developer app.
    #[serde(default)]
    pub devapp: Vec<String>,
    /// Milliseconds since the epoch of the last build, if any.
    #[serde(default)]
    pub date_compiled: Option<i64>,
}

impl ProjectSnapshot {
    pub fn from_json(text: &str) -> Result<Self, CocoonError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn has_compiled(&self) -> bool {
        self.date_compiled.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Compilation
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable build state of one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    platform: Platform,
    status: Status,
    error: Option<String>,
    download_link: Option<String>,
    dev_app: bool,
}

impl Compilation {
    /// Read `platform`'s entry from `snapshot`.
    ///
    /// A missing or unrecognized status is `Disabled` for a project that has
    /// compiled before and `Created` otherwise.
    pub fn from_snapshot(platform: Platform, snapshot: &ProjectSnapshot) -> Self {
        let key = platform.as_str();
        let fallback = if snapshot.has_compiled() { Status::Disabled } else { Status::Created };
        let status = match snapshot.status.get(key) {
            Some(raw) => raw.parse::<Status>().unwrap_or_else(|e| {
                warn!("{e} for {platform} in project {}", snapshot.id);
                fallback
            }),
            None => fallback,
        };
        let non_empty = |map: &HashMap<String, String>| {
            map.get(key).filter(|v| !v.is_empty()).cloned()
        };

        Self {
            platform,
            status,
            error: non_empty(&snapshot.error),
            download_link: non_empty(&snapshot.download),
            dev_app: snapshot.devapp.iter().any(|p| p == key),
        }
    }

    pub fn new(platform: Platform, status: Status) -> Self {
        Self { platform, status, error: None, download_link: None, dev_app: false }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_download_link(mut self, link: impl Into<String>) -> Self {
        self.download_link = Some(link.into());
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn download_link(&self) -> Option<&str> {
        self.download_link.as_deref()
    }

    pub fn is_dev_app(&self) -> bool {
        self.dev_app
    }

    /// Waiting and compiling both count as in progress.
    pub fn is_compiling(&self) -> bool {
        matches!(self.status, Status::Waiting | Status::Compiling)
    }

    /// Completed without an error.
    pub fn is_ready(&self) -> bool {
        self.status == Status::Completed && self.error.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Compilations
// ═══════════════════════════════════════════════════════════════════════════════

/// One [`Compilation`] per platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilations {
    entries: BTreeMap<Platform, Compilation>,
}

impl Compilations {
    /// Build an entry for every known platform.  Record keys that name no
    /// known platform, such as `"default"` or `""`, are logged and skipped;
    /// they never count toward [`is_compiling`](Self::is_compiling).
    pub fn from_snapshot(snapshot: &ProjectSnapshot) -> Self {
        for key in snapshot.status.keys() {
            if key.parse::<Platform>().is_err() {
                debug!("ignoring status for '{key}' in project {}", snapshot.id);
            }
        }
        Platform::ALL
            .into_iter()
            .map(|p| Compilation::from_snapshot(p, snapshot))
            .collect()
    }

    pub fn get(&self, platform: Platform) -> Option<&Compilation> {
        self.entries.get(&platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Compilation> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` while any platform is waiting or compiling.
    pub fn is_compiling(&self) -> bool {
        self.iter().any(Compilation::is_compiling)
    }

    /// `true` when `platform` has a downloadable build.
    pub fn is_ready(&self, platform: Platform) -> bool {
        self.get(platform).is_some_and(Compilation::is_ready)
    }
}

impl FromIterator<Compilation> for Compilations {
    fn from_iter<I: IntoIterator<Item = Compilation>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|c| (c.platform, c)).collect() }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

//! Target platforms known to the build service and the per-platform
//! attribute names used on the `<widget>` root.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A build target.  The wire form (`as_str`) is what appears in
/// `<platform name="..">`, `<engine name="..">` and in project records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "ios")]
    Ios,
    #[serde(rename = "osx")]
    MacOs,
    #[serde(rename = "ubuntu")]
    Ubuntu,
    #[serde(rename = "windows")]
    Windows,
}

impl Platform {
    /// Every platform, in a stable order.
    pub const ALL: [Platform; 5] = [
        Platform::Android,
        Platform::Ios,
        Platform::MacOs,
        Platform::Ubuntu,
        Platform::Windows,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::MacOs => "osx",
            Platform::Ubuntu => "ubuntu",
            Platform::Windows => "windows",
        }
    }

    /// Root attribute holding this platform's bundle identifier override.
    pub fn bundle_id_attribute(self) -> &'static str {
        match self {
            Platform::Android => "android-packageName",
            Platform::Ios => "ios-CFBundleIdentifier",
            Platform::MacOs => "osx-CFBundleIdentifier",
            Platform::Ubuntu => "ubuntu-packageName",
            Platform::Windows => "windows-packageName",
        }
    }

    /// Root attribute holding this platform's build number.
    pub fn version_code_attribute(self) -> &'static str {
        match self {
            Platform::Android => "android-versionCode",
            Platform::Ios => "ios-CFBundleVersion",
            Platform::MacOs => "osx-CFBundleVersion",
            Platform::Ubuntu => "ubuntu-versionCode",
            Platform::Windows => "windows-packageVersion",
        }
    }

    /// Root attribute holding this platform's semantic version override.
    pub fn version_attribute(self) -> String {
        format!("{}-version", self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown platform '{s}'"))
    }
}

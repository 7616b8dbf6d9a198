//! Social platform enumeration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Supported social platforms.
///
/// Serialized lowercase. Deserialization goes through [`Platform::normalize`], so
/// `"Instagram"`, `" instagram "` and `"INSTAGRAM"` all read back as the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Platform {
    Instagram,
    Tiktok,
    Twitter,
    Facebook,
    Youtube,
    Linkedin,
    Threads,
}

impl Platform {
    /// All platforms, in display order.
    pub const ALL: [Self; 7] = [
        Self::Instagram,
        Self::Tiktok,
        Self::Twitter,
        Self::Facebook,
        Self::Youtube,
        Self::Linkedin,
        Self::Threads,
    ];

    /// Parses a raw platform string.
    ///
    /// This is the only place platform strings are compared; everything else works on
    /// the enum.
    pub fn normalize(raw: &str) -> Result<Self, CoreError> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "instagram" | "ig" => Ok(Self::Instagram),
            "tiktok" => Ok(Self::Tiktok),
            "twitter" | "x" => Ok(Self::Twitter),
            "facebook" | "fb" => Ok(Self::Facebook),
            "youtube" => Ok(Self::Youtube),
            "linkedin" => Ok(Self::Linkedin),
            "threads" => Ok(Self::Threads),
            "" => Err(CoreError::Validation("platform is required".to_string())),
            _ => Err(CoreError::Validation(format!("unsupported platform: {raw}"))),
        }
    }

    /// Storage identifier (lowercase).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Youtube => "youtube",
            Self::Linkedin => "linkedin",
            Self::Threads => "threads",
        }
    }

    /// Name shown to end users.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::Tiktok => "TikTok",
            Self::Twitter => "X (Twitter)",
            Self::Facebook => "Facebook",
            Self::Youtube => "YouTube",
            Self::Linkedin => "LinkedIn",
            Self::Threads => "Threads",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<String> for Platform {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// A 32-byte BLAKE3 hash used as a content fingerprint.
///
/// The bundle executor records one for every file it writes, so two runs can
/// be compared without diffing the files themselves.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash32([u8; 32]);

impl<T> From<T> for Hash32
where
    T: Into<[u8; 32]>,
{
    fn from(value: T) -> Self {
        Hash32(value.into())
    }
}

impl Hash32 {
    pub fn hash(buffer: impl AsRef<[u8]>) -> Self {
        blake3::Hasher::new()
            .update(buffer.as_ref())
            .finalize()
            .into()
    }

    pub fn to_hex(self) -> String {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut acc = String::with_capacity(64);

        for &byte in self.0.iter() {
            acc.push(HEX[(byte >> 4) as usize] as char);
            acc.push(HEX[(byte & 0xF) as usize] as char);
        }

        acc
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Version attached to a registered asset, appended to its URL for cache
/// busting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Version {
    /// Use [`Settings::default_version`](crate::Settings::default_version).
    #[default]
    Auto,
    /// Do not append any version.
    None,
    /// A specific version string.
    Explicit(String),
}

impl Version {
    pub fn explicit(ver: impl Into<String>) -> Self {
        Version::Explicit(ver.into())
    }
}

impl From<Option<String>> for Version {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(ver) => Version::Explicit(ver),
            None => Version::None,
        }
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Version::Explicit(value.to_string())
    }
}

/// Placement of an asset in the document. Lower groups are printed first,
/// and a dependency is always pulled into the lowest group of its dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    #[default]
    Head = 0,
    Footer = 1,
}

impl Group {
    /// Interpret the loosely typed `group` data value.
    pub(crate) fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(true) => Some(Group::Footer),
            serde_json::Value::Bool(false) => Some(Group::Head),
            serde_json::Value::Number(n) => match n.as_u64() {
                Some(0) => Some(Group::Head),
                Some(_) => Some(Group::Footer),
                None => None,
            },
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "head" => Ok(Group::Head),
            "1" | "footer" => Ok(Group::Footer),
            other => Err(format!("unknown group '{other}'")),
        }
    }
}

/// Where an inline fragment is printed relative to its asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    Before,
    #[default]
    After,
}

impl Position {
    pub(crate) fn key(self) -> &'static str {
        match self {
            Position::Before => "before",
            Position::After => "after",
        }
    }
}

impl From<&str> for Position {
    /// Anything other than `"after"` means before.
    fn from(value: &str) -> Self {
        if value == "after" {
            Position::After
        } else {
            Position::Before
        }
    }
}

/// The kind of page the current session renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Front,
    Admin,
    Login,
}

/// How far the session lifecycle has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Before the registry is ready to accept assets.
    #[default]
    Boot,
    /// Registration is allowed.
    Ready,
    /// Inside the screen's designated enqueue step.
    Enqueueing,
}

/// Session configuration for a [`Scripts`](crate::Scripts) context.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Version used for assets registered with [`Version::Auto`].
    pub default_version: Option<String>,
    /// Prefix for relative asset sources.
    pub base_url: Option<String>,
    /// The screen being rendered.
    pub screen: Screen,
    /// The lifecycle phase the session starts in.
    pub phase: Phase,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_version(mut self, ver: impl Into<String>) -> Self {
        self.default_version = Some(ver.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn screen(mut self, screen: Screen) -> Self {
        self.screen = screen;
        self
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }
}

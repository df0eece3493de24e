//! JSON description of a whole session: what to register and what to enqueue.
//!
//! ```json
//! {
//!   "default_version": "6.4",
//!   "base_url": "https://example.org",
//!   "scripts": [
//!     { "handle": "a", "src": "/a.js" },
//!     { "handle": "b", "src": "/b.js", "deps": ["a"], "ver": null, "in_footer": true }
//!   ],
//!   "enqueue": ["b"]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;

use camino::Utf8Path;
use serde::Deserialize;
use serde_json::Value;

use crate::core::{Phase, Position, Screen, Settings, Version};
use crate::error::ManifestError;
use crate::scripts::Scripts;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub default_version: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub screen: Screen,
    #[serde(default)]
    pub scripts: Vec<ScriptEntry>,
    #[serde(default)]
    pub enqueue: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEntry {
    pub handle: String,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub deps: Vec<String>,
    /// Absent means the default version, `null` means none.
    #[serde(default)]
    pub ver: Version,
    #[serde(default)]
    pub in_footer: bool,
    /// Arbitrary data points, e.g. `conditional`.
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
    /// Object name to localized values.
    #[serde(default)]
    pub localize: BTreeMap<String, Value>,
    #[serde(default)]
    pub translations: Option<TranslationEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationEntry {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl Manifest {
    pub fn from_path(path: &Utf8Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::new().screen(self.screen).phase(Phase::Ready);
        settings.default_version = self.default_version.clone();
        settings.base_url = self.base_url.clone();
        settings
    }

    /// Register and enqueue everything described by the manifest.
    pub fn apply(&self, scripts: &mut Scripts) {
        for entry in &self.scripts {
            let handle = entry.handle.as_str();
            let deps: Vec<&str> = entry.deps.iter().map(String::as_str).collect();

            if !scripts.register_script(
                handle,
                entry.src.as_deref(),
                &deps,
                entry.ver.clone(),
                entry.in_footer,
            ) {
                tracing::warn!(handle, "skipping duplicate manifest entry");
                continue;
            }

            for (key, value) in &entry.data {
                scripts.script_add_data(handle, key, value.clone());
            }

            for code in &entry.before {
                scripts.add_inline_script(handle, code, Position::Before);
            }

            for code in &entry.after {
                scripts.add_inline_script(handle, code, Position::After);
            }

            for (object_name, l10n) in &entry.localize {
                scripts.localize_script(handle, object_name, l10n.clone());
            }

            if let Some(translations) = &entry.translations {
                scripts.set_script_translations(
                    handle,
                    translations.domain.as_deref(),
                    translations.path.as_deref(),
                );
            }
        }

        for handle in &self.enqueue {
            scripts.enqueue_script(handle, None, &[], Version::Auto, false);
        }
    }

    /// A fresh context with the manifest applied.
    pub fn into_scripts(self) -> Scripts {
        let mut scripts = Scripts::new(self.settings());
        self.apply(&mut scripts);
        scripts
    }
}

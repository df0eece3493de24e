use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BundleOptions, Environment};
use crate::error::BundleError;

const WORDPRESS_NAMESPACE: &str = "@wordpress/";

/// Packages that are bundled into other packages and never get an entry of
/// their own.
pub const BUNDLED_PACKAGES: &[&str] = &["@wordpress/icons", "@wordpress/interface"];

/// Packages whose global is their default export rather than the module
/// namespace.
pub const EXPORT_DEFAULT_PACKAGES: &[&str] = &[
    "api-fetch",
    "deprecated",
    "dom-ready",
    "redux-routine",
    "token-list",
    "server-side-render",
    "shortcode",
    "warning",
];

/// Vendor modules that stay outside every bundle and are read from the global
/// their own script defines: `(request, global, handle)`.
const VENDOR_EXTERNALS: &[(&str, &str, &str)] = &[
    ("jquery", "jQuery", "jquery"),
    ("lodash", "lodash", "lodash"),
    ("lodash-es", "lodash", "lodash"),
    ("moment", "moment", "moment"),
    ("react", "React", "react"),
    ("react-dom", "ReactDOM", "react-dom"),
];

/// Handle every compiled package depends on.
pub const POLYFILL_HANDLE: &str = "wp-polyfill";

/// Scratch space of the compiler, relative to the base directory.
pub const CACHE_DIR: &str = "node_modules/.cache/asset-deps";

/// Shim modules standing in for externals, relative to the base directory.
pub const EXTERNALS_DIR: &str = "node_modules/.cache/asset-deps/externals";

/// Vendor scripts shipped in development builds: `(file, node_modules path)`.
const VENDORS: &[(&str, &str)] = &[
    ("lodash.js", "lodash/lodash.js"),
    ("moment.js", "moment/moment.js"),
    ("react.js", "react/umd/react.development.js"),
    ("react-dom.js", "react-dom/umd/react-dom.development.js"),
    ("regenerator-runtime.js", "regenerator-runtime/runtime.js"),
];

/// Vendor scripts that ship their own minified build.
const MINIFIED_VENDORS: &[(&str, &str)] = &[
    ("lodash.min.js", "lodash/lodash.min.js"),
    ("moment.min.js", "moment/min/moment.min.js"),
    ("react.min.js", "react/umd/react.production.min.js"),
    ("react-dom.min.js", "react-dom/umd/react-dom.production.min.js"),
];

/// Vendor scripts minified on the way.
const MINIFY_VENDORS: &[(&str, &str)] =
    &[("regenerator-runtime.min.js", "regenerator-runtime/runtime.js")];

/// Package files copied into the source tree: `(package path, destination)`.
const PACKAGE_FILES: &[(&str, &str)] = &[(
    "block-serialization-default-parser/parser.php",
    "wp-includes/class-wp-block-parser.php",
)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Minify a script.
    Minify,
    /// Post-process a stylesheet for the current environment.
    Styles,
}

/// A compiled library entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Package name without the namespace, e.g. `api-fetch`.
    pub package: String,
    /// Script handle the package is registered under, e.g. `wp-api-fetch`.
    pub handle: String,
    pub import: Utf8PathBuf,
    /// Global the library is exposed as, e.g. `wp.apiFetch`.
    pub global: String,
    pub export_default: bool,
    pub output: Utf8PathBuf,
    /// Public URL of the output.
    pub url: String,
}

/// A module request resolved to a global at runtime instead of being bundled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct External {
    pub request: String,
    pub global: String,
    /// Script that defines the global.
    pub handle: String,
}

impl External {
    fn new(request: impl Into<String>, global: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            global: global.into(),
            handle: handle.into(),
        }
    }
}

/// A single copy instruction. `from` may be a glob; `[name]` in `to` is
/// replaced by the stem of each matched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyPattern {
    pub from: Utf8PathBuf,
    pub to: Utf8PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    pub allow_missing: bool,
}

impl CopyPattern {
    fn new(from: Utf8PathBuf, to: Utf8PathBuf) -> Self {
        Self {
            from,
            to,
            transform: None,
            allow_missing: false,
        }
    }

    fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    fn allow_missing(mut self) -> Self {
        self.allow_missing = true;
        self
    }
}

/// Everything a vendor build has to produce.
#[derive(Debug, Clone, Serialize)]
pub struct BundlePlan {
    pub environment: Environment,
    pub suffix: &'static str,
    pub base_dir: Utf8PathBuf,
    /// Output root relative to `base_dir`, e.g. `build/wp-includes`.
    pub target: Utf8PathBuf,
    pub packages: Vec<String>,
    pub entries: Vec<Entry>,
    pub externals: Vec<External>,
    pub copies: Vec<CopyPattern>,
    /// `(identifier, JavaScript expression)` pairs substituted at compile time.
    pub defines: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_reload_port: Option<u16>,
    /// Handles, dependencies and versions of the compiled packages.
    pub asset_manifest: Utf8PathBuf,
}

impl BundlePlan {
    pub fn new(options: &BundleOptions) -> Self {
        let environment = options.environment;
        let base = &options.base_dir;

        let suffix = match environment {
            Environment::Production => ".min",
            Environment::Development => "",
        };

        let target = match &options.build_target {
            Some(target) => target.clone(),
            None => match environment {
                Environment::Production => Utf8PathBuf::from("build"),
                Environment::Development => Utf8PathBuf::from("src"),
            },
        }
        .join("wp-includes");

        let packages: Vec<String> = options
            .dependencies
            .iter()
            .filter(|name| !BUNDLED_PACKAGES.contains(&name.as_str()))
            .filter_map(|name| name.strip_prefix(WORDPRESS_NAMESPACE))
            .map(str::to_string)
            .collect();

        let node_modules = base.join("node_modules");
        let dist = base.join(&target).join("js/dist");

        let entries = packages
            .iter()
            .map(|package| Entry {
                package: package.clone(),
                handle: format!("wp-{package}"),
                import: node_modules.join(WORDPRESS_NAMESPACE).join(package),
                global: format!("wp.{}", camel_case_dash(package)),
                export_default: EXPORT_DEFAULT_PACKAGES.contains(&package.as_str()),
                output: dist.join(format!("{package}{suffix}.js")),
                url: format!("/wp-includes/js/dist/{package}{suffix}.js"),
            })
            .collect::<Vec<_>>();

        let externals = VENDOR_EXTERNALS
            .iter()
            .map(|(request, global, handle)| External::new(*request, *global, *handle))
            .chain(entries.iter().map(|entry| {
                External::new(
                    format!("{WORDPRESS_NAMESPACE}{}", entry.package),
                    &entry.global,
                    &entry.handle,
                )
            }))
            .collect();

        let vendor = |(file, from): &(&str, &str)| {
            CopyPattern::new(node_modules.join(from), dist.join("vendor").join(file))
        };

        let mut copies: Vec<CopyPattern> = match environment {
            Environment::Development => VENDORS.iter().map(vendor).collect(),
            Environment::Production => MINIFIED_VENDORS
                .iter()
                .map(vendor)
                .chain(
                    MINIFY_VENDORS
                        .iter()
                        .map(|pair| vendor(pair).transform(Transform::Minify)),
                )
                .collect(),
        };

        copies.extend(packages.iter().map(|package| {
            CopyPattern::new(
                node_modules
                    .join(WORDPRESS_NAMESPACE)
                    .join(package)
                    .join("build-style/*.css"),
                base.join(&target)
                    .join("css/dist")
                    .join(package)
                    .join(format!("[name]{suffix}.css")),
            )
            .transform(Transform::Styles)
            .allow_missing()
        }));

        copies.extend(PACKAGE_FILES.iter().map(|(file, to)| {
            CopyPattern::new(
                node_modules.join(WORDPRESS_NAMESPACE).join(file),
                base.join("src").join(to),
            )
        }));

        let reduced_motion = match &options.force_reduced_motion {
            Some(value) => Value::String(value.clone()).to_string(),
            None => "undefined".to_string(),
        };

        let defines = vec![
            ("process.env.IS_GUTENBERG_PLUGIN".to_string(), "false".to_string()),
            ("process.env.FORCE_REDUCED_MOTION".to_string(), reduced_motion),
        ];

        let live_reload_port = match environment {
            Environment::Development => Some(options.live_reload_port),
            Environment::Production => None,
        };

        Self {
            environment,
            suffix,
            base_dir: base.clone(),
            target: target.clone(),
            packages,
            entries,
            externals,
            copies,
            defines,
            live_reload_port,
            asset_manifest: base.join(&target).join("assets/script-loader-packages.json"),
        }
    }
}

/// `api-fetch` → `apiFetch`: a dash followed by a lowercase letter becomes
/// that letter uppercased.
pub fn camel_case_dash(name: &str) -> String {
    let mut acc = String::with_capacity(name.len());
    let mut dash = false;

    for c in name.chars() {
        if dash {
            dash = false;
            if c.is_ascii_lowercase() {
                acc.push(c.to_ascii_uppercase());
                continue;
            }
            acc.push('-');
        }

        match c {
            '-' => dash = true,
            _ => acc.push(c),
        }
    }

    if dash {
        acc.push('-');
    }

    acc
}

#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, Value>,
}

/// Dependency names listed in a `package.json` file.
pub fn read_dependencies(path: &Utf8Path) -> Result<Vec<String>, BundleError> {
    let text = fs::read_to_string(path).map_err(BundleError::Package)?;
    let package: PackageJson = serde_json::from_str(&text)?;
    Ok(package.dependencies.into_keys().collect())
}

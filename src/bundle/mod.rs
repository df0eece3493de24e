//! Vendor bundle planning.
//!
//! Given the dependency list of a `package.json`, [`BundlePlan::new`] works
//! out which `@wordpress/` packages are compiled into `wp.*` globals, which
//! vendor scripts and stylesheets are copied next to them, and where
//! everything lands. The plan is plain data; [`BundlePlan::copy`] and
//! [`BundlePlan::compile`] carry it out through a [`Transformer`].
//!
//! Compiled packages keep their vendor and `@wordpress/` imports external,
//! reading them from globals at runtime. The modules each package ends up
//! importing become its dependencies in the asset manifest, which loads as
//! a regular [`Manifest`](crate::Manifest).

mod copy;
mod plan;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

pub use copy::{AssetManifest, CopyReport, PackageAsset, Written};
pub use plan::{
    BUNDLED_PACKAGES, BundlePlan, CACHE_DIR, CopyPattern, EXPORT_DEFAULT_PACKAGES, EXTERNALS_DIR,
    Entry, External, POLYFILL_HANDLE, Transform, camel_case_dash, read_dependencies,
};

use crate::error::BundleError;
use crate::io::write_file;

/// Default port of the live-reload server in development builds.
pub const LIVE_RELOAD_PORT: u16 = 35729;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Inputs of a bundle plan.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub environment: Environment,
    /// Overrides the `build`/`src` default.
    pub build_target: Option<Utf8PathBuf>,
    pub base_dir: Utf8PathBuf,
    /// Dependency names, as listed in `package.json`.
    pub dependencies: Vec<String>,
    pub live_reload_port: u16,
    pub force_reduced_motion: Option<String>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            build_target: None,
            base_dir: Utf8PathBuf::from("."),
            dependencies: Vec::new(),
            live_reload_port: LIVE_RELOAD_PORT,
            force_reduced_motion: None,
        }
    }
}

impl BundleOptions {
    pub fn new(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    /// Like [`BundleOptions::new`], with `WORDPRESS_LIVE_RELOAD_PORT` and
    /// `FORCE_REDUCED_MOTION` read from the environment.
    pub fn from_env(base_dir: impl Into<Utf8PathBuf>) -> Self {
        let mut options = Self::new(base_dir);

        if let Ok(port) = std::env::var("WORDPRESS_LIVE_RELOAD_PORT") {
            match port.parse() {
                Ok(port) => options.live_reload_port = port,
                Err(_) => tracing::warn!(port = port.as_str(), "ignoring invalid live reload port"),
            }
        }

        options.force_reduced_motion = std::env::var("FORCE_REDUCED_MOTION").ok();
        options
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn build_target(mut self, target: impl Into<Utf8PathBuf>) -> Self {
        self.build_target = Some(target.into());
        self
    }

    pub fn dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Take the dependency list from a `package.json` file.
    pub fn package_json(self, path: &Utf8Path) -> Result<Self, BundleError> {
        let dependencies = read_dependencies(path)?;
        Ok(self.dependencies(dependencies))
    }
}

/// Output of compiling one library entry.
#[derive(Debug, Clone, Default)]
pub struct Compiled {
    pub code: Vec<u8>,
    /// Handles of the externals the bundle imports.
    pub externals: Vec<String>,
}

/// Rewrites file contents on their way into the build target.
pub trait Transformer: Send + Sync {
    /// Runs once before any entry of `plan` is compiled.
    fn prepare(&self, _plan: &BundlePlan) -> anyhow::Result<()> {
        Ok(())
    }

    fn transform(
        &self,
        transform: Transform,
        environment: Environment,
        path: &Utf8Path,
        content: Vec<u8>,
    ) -> anyhow::Result<Vec<u8>>;

    /// Bundle a library entry into a single script.
    fn compile(&self, entry: &Entry, plan: &BundlePlan) -> anyhow::Result<Compiled>;
}

/// Runs the `esbuild` binary, which has to be on `PATH`.
#[derive(Debug, Clone)]
pub struct Esbuild {
    pub binary: String,
}

impl Default for Esbuild {
    fn default() -> Self {
        Self {
            binary: "esbuild".to_string(),
        }
    }
}

impl Esbuild {
    fn run(&self, mut command: Command, stdin: Option<&[u8]>) -> Result<Vec<u8>, BundleError> {
        let mut child = command
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(data) = stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            pipe.write_all(data)?;
        }

        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(BundleError::Esbuild(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        Ok(output.stdout)
    }
}

impl Transformer for Esbuild {
    fn transform(
        &self,
        transform: Transform,
        environment: Environment,
        _: &Utf8Path,
        content: Vec<u8>,
    ) -> anyhow::Result<Vec<u8>> {
        let mut command = Command::new(&self.binary);

        match transform {
            Transform::Minify => {
                command.arg("--loader=js").arg("--minify");
            }
            Transform::Styles => {
                if environment == Environment::Development {
                    return Ok(content);
                }
                command.arg("--loader=css").arg("--minify");
            }
        }

        Ok(self.run(command, Some(&content))?)
    }

    /// Write one CommonJS shim per external, re-exporting its global.
    fn prepare(&self, plan: &BundlePlan) -> anyhow::Result<()> {
        let dir = plan.base_dir.join(EXTERNALS_DIR);

        for external in &plan.externals {
            let shim = format!("module.exports = window.{};\n", external.global);
            write_file(&dir.join(format!("{}.js", external.handle)), shim.as_bytes())?;
        }

        Ok(())
    }

    fn compile(&self, entry: &Entry, plan: &BundlePlan) -> anyhow::Result<Compiled> {
        let metafile = Utf8PathBuf::from(CACHE_DIR).join(format!("{}.meta.json", entry.package));

        let mut command = Command::new(&self.binary);
        command
            .current_dir(&plan.base_dir)
            .args(compile_args(entry, plan, &metafile));

        let code = self.run(command, None)?;
        let meta = fs::read_to_string(plan.base_dir.join(&metafile))?;

        Ok(Compiled {
            code,
            externals: externals_used(&meta)?,
        })
    }
}

/// Arguments of an esbuild run compiling `entry`, with paths relative to the
/// base directory of the plan.
pub fn compile_args(entry: &Entry, plan: &BundlePlan, metafile: &Utf8Path) -> Vec<String> {
    let import = match entry.import.strip_prefix(&plan.base_dir) {
        Ok(relative) => format!("./{relative}"),
        Err(_) => entry.import.to_string(),
    };

    let mut args = vec![
        import,
        "--bundle".to_string(),
        "--format=iife".to_string(),
        format!("--global-name={}", entry.global),
        format!("--metafile={metafile}"),
    ];

    if plan.environment == Environment::Production {
        args.push("--minify".to_string());
    }

    for (name, value) in &plan.defines {
        args.push(format!("--define:{name}={value}"));
    }

    for external in &plan.externals {
        if external.handle == entry.handle {
            continue;
        }
        args.push(format!(
            "--alias:{}=./{EXTERNALS_DIR}/{}.js",
            external.request, external.handle
        ));
    }

    if entry.export_default {
        args.push(format!("--footer:js={0} = {0}.default;", entry.global));
    }

    args
}

#[derive(Deserialize)]
struct Metafile {
    inputs: BTreeMap<String, IgnoredAny>,
}

/// Handles of the external shims listed among the inputs of an esbuild
/// metafile.
pub fn externals_used(metafile: &str) -> Result<Vec<String>, serde_json::Error> {
    let meta: Metafile = serde_json::from_str(metafile)?;

    let handles = meta
        .inputs
        .keys()
        .filter_map(|input| {
            let input = Utf8Path::new(input.strip_prefix("./").unwrap_or(input.as_str()));
            let shim = input.strip_prefix(EXTERNALS_DIR).ok()?;
            shim.file_stem().map(str::to_string)
        })
        .collect();

    Ok(handles)
}

use std::collections::BTreeSet;
use std::fs;
use std::time::Instant;

use camino::Utf8PathBuf;
use glob::glob;
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;

use super::{BundlePlan, Compiled, CopyPattern, Entry, POLYFILL_HANDLE, Transform, Transformer};
use crate::core::Hash32;
use crate::error::BundleError;
use crate::io::{as_overhead, progress_bar, write_file};

/// A file produced by the bundle executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Written {
    pub path: Utf8PathBuf,
    pub hash: Hash32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CopyReport {
    pub written: Vec<Written>,
}

impl CopyReport {
    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

/// Registration data of a compiled package, in the shape of a manifest
/// script entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageAsset {
    pub handle: String,
    pub src: String,
    pub deps: Vec<String>,
    pub ver: Hash32,
    pub in_footer: bool,
}

impl PackageAsset {
    fn new(entry: &Entry, externals: Vec<String>, ver: Hash32) -> Self {
        let mut deps: BTreeSet<String> = externals.into_iter().collect();
        deps.insert(POLYFILL_HANDLE.to_string());
        deps.remove(&entry.handle);

        Self {
            handle: entry.handle.clone(),
            src: entry.url.clone(),
            deps: deps.into_iter().collect(),
            ver,
            in_footer: true,
        }
    }
}

/// Every compiled package of a build, loadable as a
/// [`Manifest`](crate::Manifest).
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetManifest {
    pub scripts: Vec<PackageAsset>,
}

/// One resolved source file and its destination.
struct Job {
    from: Utf8PathBuf,
    to: Utf8PathBuf,
    transform: Option<Transform>,
}

fn has_magic(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

impl CopyPattern {
    fn expand(&self) -> Result<Vec<Job>, BundleError> {
        let job = |from: Utf8PathBuf| {
            let to = match from.file_stem() {
                Some(stem) => Utf8PathBuf::from(self.to.as_str().replace("[name]", stem)),
                None => self.to.clone(),
            };

            Job {
                from,
                to,
                transform: self.transform,
            }
        };

        let mut jobs = Vec::new();

        if has_magic(self.from.as_str()) {
            for path in glob(self.from.as_str())? {
                jobs.push(job(Utf8PathBuf::try_from(path?)?));
            }
        } else if self.from.is_file() {
            jobs.push(job(self.from.clone()));
        }

        if jobs.is_empty() {
            if !self.allow_missing {
                return Err(BundleError::MissingSource(self.from.to_string()));
            }
            tracing::debug!(from = self.from.as_str(), "no sources, skipping");
        }

        Ok(jobs)
    }
}

impl Job {
    fn run(self, plan: &BundlePlan, transformer: &dyn Transformer) -> Result<Written, BundleError> {
        let content =
            fs::read(&self.from).map_err(|err| BundleError::Copy(self.from.to_string(), err))?;

        let content = match self.transform {
            Some(transform) => transformer
                .transform(transform, plan.environment, &self.from, content)
                .map_err(|err| BundleError::Transform(self.from.to_string(), err))?,
            None => content,
        };

        write_file(&self.to, &content).map_err(|err| BundleError::Copy(self.to.to_string(), err))?;

        Ok(Written {
            path: self.to,
            hash: Hash32::hash(&content),
        })
    }
}

impl BundlePlan {
    /// Carry out every copy pattern of the plan.
    pub fn copy(&self, transformer: &dyn Transformer) -> Result<CopyReport, BundleError> {
        let s = Instant::now();

        let mut jobs = Vec::new();
        for pattern in &self.copies {
            jobs.extend(pattern.expand()?);
        }

        let pb = progress_bar(jobs.len(), "Copying vendor files...");

        let written = jobs
            .into_par_iter()
            .map(|job| {
                let result = job.run(self, transformer);
                pb.inc(1);
                result
            })
            .collect::<Result<Vec<_>, _>>()?;

        pb.finish_with_message(format!("Copied vendor files {}", as_overhead(s)));
        tracing::info!(files = written.len(), "copied vendor files");

        Ok(CopyReport { written })
    }

    /// Compile every library entry of the plan, then write the asset
    /// manifest describing them. The manifest is the last written file.
    pub fn compile(&self, transformer: &dyn Transformer) -> Result<CopyReport, BundleError> {
        let s = Instant::now();

        transformer
            .prepare(self)
            .map_err(|err| BundleError::Transform("externals".to_string(), err))?;

        let pb = progress_bar(self.entries.len(), "Compiling packages...");

        let compiled = self
            .entries
            .par_iter()
            .map(|entry| -> Result<(Written, PackageAsset), BundleError> {
                let Compiled { code, externals } = transformer
                    .compile(entry, self)
                    .map_err(|err| BundleError::Transform(entry.package.clone(), err))?;

                write_file(&entry.output, &code)
                    .map_err(|err| BundleError::Copy(entry.output.to_string(), err))?;

                pb.inc(1);

                let hash = Hash32::hash(&code);
                tracing::debug!(handle = entry.handle.as_str(), ?externals, "compiled");

                let written = Written {
                    path: entry.output.clone(),
                    hash,
                };

                Ok((written, PackageAsset::new(entry, externals, hash)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (mut written, scripts): (Vec<_>, Vec<_>) = compiled.into_iter().unzip();

        let manifest = serde_json::to_vec_pretty(&AssetManifest { scripts })
            .map_err(BundleError::AssetManifest)?;
        write_file(&self.asset_manifest, &manifest)
            .map_err(|err| BundleError::Copy(self.asset_manifest.to_string(), err))?;

        written.push(Written {
            path: self.asset_manifest.clone(),
            hash: Hash32::hash(&manifest),
        });

        pb.finish_with_message(format!("Compiled packages {}", as_overhead(s)));
        tracing::info!(packages = self.entries.len(), "compiled packages");

        Ok(CopyReport { written })
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;

    use super::*;
    use crate::bundle::{BundleOptions, Environment};
    use crate::core::Version;
    use crate::manifest::Manifest;

    /// Uppercases on transform, echoes the global on compile. Every package
    /// imports React, and `dom-ready` imports itself too.
    struct Upper;

    impl Transformer for Upper {
        fn transform(
            &self,
            _: Transform,
            _: Environment,
            _: &Utf8Path,
            content: Vec<u8>,
        ) -> anyhow::Result<Vec<u8>> {
            Ok(content.to_ascii_uppercase())
        }

        fn compile(&self, entry: &Entry, _: &BundlePlan) -> anyhow::Result<Compiled> {
            Ok(Compiled {
                code: entry.global.clone().into_bytes(),
                externals: vec!["react".into(), "wp-dom-ready".into()],
            })
        }
    }

    fn touch(root: &Utf8Path, path: &str, content: &str) {
        write_file(&root.join(path), content.as_bytes()).unwrap();
    }

    fn base() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    fn seed_vendors(root: &Utf8Path) {
        for path in [
            "lodash/lodash.min.js",
            "moment/min/moment.min.js",
            "react/umd/react.production.min.js",
            "react-dom/umd/react-dom.production.min.js",
            "regenerator-runtime/runtime.js",
            "@wordpress/block-serialization-default-parser/parser.php",
        ] {
            touch(root, &format!("node_modules/{path}"), "code");
        }
    }

    #[test]
    fn test_copy_production() {
        let (_dir, root) = base();
        seed_vendors(&root);
        touch(&root, "node_modules/@wordpress/components/build-style/style.css", "a{}");
        touch(&root, "node_modules/@wordpress/components/build-style/style-rtl.css", "b{}");

        let options = BundleOptions::new(root.clone()).dependencies([
            "@wordpress/components",
            "@wordpress/block-serialization-default-parser",
        ]);
        let plan = BundlePlan::new(&options);
        let report = plan.copy(&Upper).unwrap();

        // 5 vendors, 2 stylesheets, 1 parser; the parser package has no styles.
        assert_eq!(report.len(), 8);

        let dist = root.join("build/wp-includes");
        let minified = fs::read_to_string(dist.join("js/dist/vendor/regenerator-runtime.min.js")).unwrap();
        assert_eq!(minified, "CODE");
        let copied = fs::read_to_string(dist.join("js/dist/vendor/react.min.js")).unwrap();
        assert_eq!(copied, "code");

        let css = fs::read_to_string(dist.join("css/dist/components/style-rtl.min.css")).unwrap();
        assert_eq!(css, "B{}");
        assert!(root.join("src/wp-includes/class-wp-block-parser.php").is_file());

        let written = report
            .written
            .iter()
            .find(|w| w.path.ends_with("react.min.js"))
            .unwrap();
        assert_eq!(written.hash, Hash32::hash("code"));
    }

    #[test]
    fn test_missing_source() {
        let (_dir, root) = base();
        let plan = BundlePlan::new(&BundleOptions::new(root.clone()));

        let err = plan.copy(&Upper).unwrap_err();
        assert!(matches!(err, BundleError::MissingSource(_)));
    }

    #[test]
    fn test_compile() {
        let (_dir, root) = base();
        let options = BundleOptions::new(root.clone())
            .environment(Environment::Development)
            .dependencies(["@wordpress/dom-ready"]);

        let plan = BundlePlan::new(&options);
        let report = plan.compile(&Upper).unwrap();
        assert_eq!(report.len(), 2);

        let output = root.join("src/wp-includes/js/dist/dom-ready.js");
        assert_eq!(fs::read_to_string(output).unwrap(), "wp.domReady");
        assert_eq!(report.written.last().unwrap().path, plan.asset_manifest);
    }

    #[test]
    fn test_asset_manifest() {
        let (_dir, root) = base();
        let options = BundleOptions::new(root.clone())
            .dependencies(["@wordpress/dom-ready", "@wordpress/a11y"]);

        let plan = BundlePlan::new(&options);
        plan.compile(&Upper).unwrap();

        let manifest = Manifest::from_path(&plan.asset_manifest).unwrap();
        assert_eq!(manifest.scripts.len(), 2);

        let a11y = manifest.scripts.iter().find(|s| s.handle == "wp-a11y").unwrap();
        assert_eq!(a11y.src.as_deref(), Some("/wp-includes/js/dist/a11y.min.js"));
        assert_eq!(a11y.deps, ["react", "wp-dom-ready", "wp-polyfill"]);
        assert_eq!(a11y.ver, Version::explicit(Hash32::hash("wp.a11y").to_hex()));
        assert!(a11y.in_footer);

        let dom_ready = manifest.scripts.iter().find(|s| s.handle == "wp-dom-ready").unwrap();
        assert_eq!(dom_ready.deps, ["react", "wp-polyfill"]);

        // The manifest registers cleanly and resolves dependencies first.
        let mut scripts = manifest.into_scripts();
        scripts.register_script("react", Some("/react.js"), &[], Version::None, false);
        scripts.register_script("wp-polyfill", Some("/polyfill.js"), &[], Version::None, false);
        scripts.enqueue_script("wp-a11y", None, &[], Version::Auto, false);

        let order: Vec<_> = scripts
            .do_footer_items()
            .into_iter()
            .map(|emission| emission.handle)
            .collect();
        assert_eq!(order, ["react", "wp-polyfill", "wp-dom-ready", "wp-a11y"]);
    }
}

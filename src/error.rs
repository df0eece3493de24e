use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Error while reading the manifest:\n{0}")]
    Manifest(#[from] ManifestError),

    #[error("Error while bundling vendor assets:\n{0}")]
    Bundle(#[from] BundleError),
}

/// Validation failures of the registry. The script façade reports these as a
/// plain `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Asset '{0}' is already registered")]
    Duplicate(String),

    #[error("Asset '{0}' is not registered")]
    Unknown(String),

    #[error("Asset '{0}': inline data must not be empty")]
    EmptyInline(String),
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Couldn't read manifest file.\n{0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Couldn't parse manifest.\n{0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Couldn't read package file.\n{0}")]
    Package(#[source] std::io::Error),

    #[error("Couldn't parse package file.\n{0}")]
    PackageJson(#[from] serde_json::Error),

    #[error("Couldn't compile glob pattern.\n{0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Couldn't run glob.\n{0}")]
    Glob(#[from] glob::GlobError),

    #[error("Couldn't convert path to UTF-8.\n{0}")]
    PathFormat(#[from] camino::FromPathBufError),

    #[error("Source '{0}' does not exist")]
    MissingSource(String),

    #[error("Couldn't copy '{0}'.\n{1}")]
    Copy(String, std::io::Error),

    #[error("Transform failed for '{0}'.\n{1}")]
    Transform(String, anyhow::Error),

    #[error("Couldn't serialize asset manifest.\n{0}")]
    AssetManifest(#[source] serde_json::Error),

    #[error("Esbuild execution failed: {0}")]
    Esbuild(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

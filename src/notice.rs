//! Developer-facing diagnostics.
//!
//! Nothing in this crate aborts on misuse. Calls made too early, attempts to
//! remove protected assets, or queued assets whose dependencies are missing
//! all produce a [`Notice`]. Every notice is logged through `tracing` as it is
//! recorded, and also kept on the owning context so callers can inspect them
//! after a pass.

use std::fmt;

/// Version recorded on notices raised by this crate.
pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A single advisory diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Notice {
    /// A function was called in a way or at a time it shouldn't be.
    DoingItWrong {
        function: &'static str,
        message: String,
        version: &'static str,
    },
    /// A deprecated entry point was used.
    Deprecated {
        function: &'static str,
        version: &'static str,
        replacement: Option<&'static str>,
    },
    /// A queued asset, or one of its dependencies, is not registered.
    MissingDependency { handle: String, missing: String },
    /// An alias with no source, no dependencies and no inline code.
    UnresolvableAlias { handle: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::DoingItWrong {
                function,
                message,
                version,
            } => write!(
                f,
                "{function} was called incorrectly. {message} (This message was added in version {version}.)"
            ),
            Notice::Deprecated {
                function,
                version,
                replacement: Some(replacement),
            } => write!(
                f,
                "{function} is deprecated since version {version}! Use {replacement} instead."
            ),
            Notice::Deprecated {
                function,
                version,
                replacement: None,
            } => write!(
                f,
                "{function} is deprecated since version {version} with no alternative available."
            ),
            Notice::MissingDependency { handle, missing } if handle == missing => {
                write!(f, "Asset '{handle}' is not registered")
            }
            Notice::MissingDependency { handle, missing } => {
                write!(f, "Asset '{handle}' depends on '{missing}', which is not registered")
            }
            Notice::UnresolvableAlias { handle } => write!(
                f,
                "Alias '{handle}' has no source, no dependencies and no inline code"
            ),
        }
    }
}

/// Collector for notices raised by a context.
#[derive(Debug, Default, Clone)]
pub struct Notices {
    list: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        tracing::warn!("{notice}");
        self.list.push(notice);
    }

    pub fn doing_it_wrong(
        &mut self,
        function: &'static str,
        message: impl Into<String>,
        version: &'static str,
    ) {
        self.push(Notice::DoingItWrong {
            function,
            message: message.into(),
            version,
        });
    }

    /// Mark `function` as deprecated since `version`, pointing at its
    /// replacement if there is one.
    pub fn deprecated_function(
        &mut self,
        function: &'static str,
        version: &'static str,
        replacement: Option<&'static str>,
    ) {
        self.push(Notice::Deprecated {
            function,
            version,
            replacement,
        });
    }

    pub fn as_slice(&self) -> &[Notice] {
        &self.list
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn take(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.list)
    }
}

#![forbid(unsafe_code)]
//! Dependency-ordered script registry.
//!
//! Scripts are registered under a handle together with their source URL,
//! their dependencies and a version. Some of them are then enqueued, and the
//! whole queue is emitted in an order where every script comes after
//! everything it depends on.
//!
//! ```rust
//! use asset_deps::{Phase, Scripts, Settings, Version};
//!
//! let mut scripts = Scripts::new(Settings::new().phase(Phase::Ready));
//! scripts.register_script("a", Some("/a.js"), &[], Version::None, false);
//! scripts.register_script("b", Some("/b.js"), &["a"], Version::None, false);
//! scripts.enqueue_script("b", None, &[], Version::Auto, false);
//!
//! let order: Vec<_> = scripts
//!     .print_scripts(None)
//!     .into_iter()
//!     .map(|emission| emission.handle)
//!     .collect();
//!
//! assert_eq!(order, ["a", "b"]);
//! ```
//!
//! The [`bundle`] module plans and runs the vendor build that produces the
//! files these scripts point at.

mod asset;
pub mod bundle;
mod core;
mod deprecated;
mod emit;
mod error;
mod io;
pub mod manifest;
mod notice;
mod queue;
mod registry;
mod resolver;
mod scripts;

pub use crate::asset::Asset;
pub use crate::core::{Group, Hash32, Phase, Position, Screen, Settings, Version};
pub use crate::emit::{Emission, Translations, asset_url};
pub use crate::error::*;
pub use crate::manifest::Manifest;
pub use crate::notice::{Notice, Notices};
pub use crate::queue::{Queue, split_handle};
pub use crate::registry::Registry;
pub use crate::resolver::{Resolution, Resolved, Resolver, resolve};
pub use crate::scripts::{List, PROTECTED_HANDLES, Scripts};

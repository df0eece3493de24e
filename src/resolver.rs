//! Dependency expansion of the queue.
//!
//! The resolver walks queued handles depth first and appends every asset to
//! its `to_do` list only after all of its dependencies. Handles already
//! emitted in an earlier pass are kept in `done` and never revisited.
//!
//! Two properties matter to callers:
//!
//! * **Cycles are tolerated.** Handles on the current walk are kept in an
//!   in-progress set. Meeting one of them again just skips it, so a cycle
//!   costs nothing more than an arbitrary (but deterministic) cut.
//! * **Missing dependencies are local.** If a handle, or anything it
//!   transitively requires, is not registered, that handle's chain is
//!   abandoned up to the queued handle that asked for it and a
//!   [`Notice::MissingDependency`] is recorded. Everything else in the queue
//!   still resolves.

use std::collections::{HashMap, HashSet};

use crate::core::Group;
use crate::notice::Notice;
use crate::queue::{Queue, split_handle};
use crate::registry::Registry;

enum Abort {
    Missing(String),
    Alias(String),
}

/// One entry of a resolved order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub handle: String,
    pub group: Group,
    pub alias: bool,
}

/// Snapshot of a resolution pass.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub entries: Vec<Resolved>,
    pub notices: Vec<Notice>,
}

impl Resolution {
    /// The resolved order with aliases replaced by what they stand for.
    pub fn handles(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| !entry.alias)
            .map(|entry| entry.handle.as_str())
            .collect()
    }

    /// Concrete handles placed in `group`.
    pub fn group(&self, group: Group) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| !entry.alias && entry.group == group)
            .map(|entry| entry.handle.as_str())
            .collect()
    }
}

/// Resolve a queue against a registry from scratch.
pub fn resolve(registry: &Registry, queue: &Queue) -> Resolution {
    let mut resolver = Resolver::new();
    resolver.all_deps(registry, queue.handles(), None);
    resolver.resolution(registry)
}

#[derive(Debug, Default, Clone)]
pub struct Resolver {
    to_do: Vec<String>,
    done: Vec<String>,
    groups: HashMap<String, Group>,
    args: HashMap<String, String>,
    notices: Vec<Notice>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand `handles` into `to_do`.
    ///
    /// `group` caps the group of every expanded handle; pass `None` to keep
    /// each asset's own placement.
    pub fn all_deps<S: AsRef<str>>(
        &mut self,
        registry: &Registry,
        handles: &[S],
        group: Option<Group>,
    ) {
        let mut in_progress = HashSet::new();

        for handle in handles {
            let (name, args) = split_handle(handle.as_ref());

            match self.visit(registry, name, group, &mut in_progress) {
                Ok(()) => {
                    if let Some(args) = args {
                        self.args.insert(name.to_string(), args.to_string());
                    }
                }
                Err(Abort::Missing(missing)) => self.notices.push(Notice::MissingDependency {
                    handle: name.to_string(),
                    missing,
                }),
                Err(Abort::Alias(alias)) => self
                    .notices
                    .push(Notice::UnresolvableAlias { handle: alias }),
            }
        }
    }

    fn visit(
        &mut self,
        registry: &Registry,
        handle: &str,
        parent: Option<Group>,
        in_progress: &mut HashSet<String>,
    ) -> Result<(), Abort> {
        if self.is_done(handle) || in_progress.contains(handle) {
            return Ok(());
        }

        let Some(asset) = registry.get(handle) else {
            return Err(Abort::Missing(handle.to_string()));
        };

        if let Some(missing) = asset.deps.iter().find(|dep| !registry.contains(dep)) {
            return Err(Abort::Missing(missing.clone()));
        }

        if asset.is_alias() && asset.deps.is_empty() && !asset.has_inline() {
            return Err(Abort::Alias(handle.to_string()));
        }

        let queued = self.is_to_do(handle);
        let moved = self.set_group(handle, asset.group, parent);

        // Already placed, and its dependencies are already in the right group.
        if queued && !moved {
            return Ok(());
        }

        let group = self.groups[handle];

        in_progress.insert(handle.to_string());
        let result = asset
            .deps
            .iter()
            .try_for_each(|dep| self.visit(registry, dep, Some(group), in_progress));
        in_progress.remove(handle);
        result?;

        if !queued {
            tracing::debug!(handle, ?group, "resolved");
            self.to_do.push(handle.to_string());
        }

        Ok(())
    }

    /// Lower the group of `handle` to its dependent's group when needed.
    /// Returns whether the stored group changed.
    fn set_group(&mut self, handle: &str, own: Group, parent: Option<Group>) -> bool {
        let group = match parent {
            Some(parent) if own > parent => parent,
            _ => own,
        };

        if let Some(&current) = self.groups.get(handle)
            && current <= group
        {
            return false;
        }

        self.groups.insert(handle.to_string(), group);
        true
    }

    pub fn is_done(&self, handle: &str) -> bool {
        self.done.iter().any(|done| done == handle)
    }

    pub fn is_to_do(&self, handle: &str) -> bool {
        self.to_do.iter().any(|to_do| to_do == handle)
    }

    pub fn to_do(&self) -> &[String] {
        &self.to_do
    }

    pub fn done(&self) -> &[String] {
        &self.done
    }

    pub fn group_of(&self, handle: &str) -> Option<Group> {
        self.groups.get(handle).copied()
    }

    pub fn args(&self, handle: &str) -> Option<&str> {
        self.args.get(handle).map(String::as_str)
    }

    pub(crate) fn take_to_do(&mut self) -> Vec<String> {
        std::mem::take(&mut self.to_do)
    }

    pub(crate) fn mark_done(&mut self, handle: &str) {
        if !self.is_done(handle) {
            self.done.push(handle.to_string());
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Snapshot of the current `to_do` list.
    pub fn resolution(&mut self, registry: &Registry) -> Resolution {
        let entries = self
            .to_do
            .iter()
            .map(|handle| Resolved {
                handle: handle.clone(),
                group: self.groups.get(handle).copied().unwrap_or_default(),
                alias: registry.get(handle).is_none_or(|asset| asset.is_alias()),
            })
            .collect();

        Resolution {
            entries,
            notices: self.take_notices(),
        }
    }
}

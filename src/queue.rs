use std::collections::{HashMap, HashSet};

use crate::registry::Registry;

/// Split `"handle?args"` into the handle and its optional query args.
pub fn split_handle(handle: &str) -> (&str, Option<&str>) {
    match handle.split_once('?') {
        Some((name, args)) => (name, Some(args)),
        None => (handle, None),
    }
}

/// Handles requested for output, in the order they were requested.
///
/// Insertion order only affects tie-breaking; the final order is decided by
/// the dependency graph.
#[derive(Debug, Default, Clone)]
pub struct Queue {
    handles: Vec<String>,
    args: HashMap<String, String>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert. Unregistered handles are accepted here and reported
    /// when the queue is resolved.
    pub fn enqueue(&mut self, handle: &str) {
        let (name, args) = split_handle(handle);

        if !self.contains(name) {
            self.handles.push(name.to_string());
        }

        if let Some(args) = args {
            self.args.insert(name.to_string(), args.to_string());
        }
    }

    /// Idempotent removal.
    pub fn dequeue(&mut self, handle: &str) {
        let (name, _) = split_handle(handle);
        self.handles.retain(|queued| queued != name);
        self.args.remove(name);
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.handles.iter().any(|queued| queued == handle)
    }

    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn args(&self, handle: &str) -> Option<&str> {
        self.args.get(handle).map(String::as_str)
    }

    /// Whether `handle` is queued, or is a transitive dependency of something
    /// that is.
    pub fn requires(&self, registry: &Registry, handle: &str) -> bool {
        if self.contains(handle) {
            return true;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = self.handles.iter().map(String::as_str).collect();

        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            let Some(asset) = registry.get(next) else {
                continue;
            };
            for dep in &asset.deps {
                if dep == handle {
                    return true;
                }
                stack.push(dep);
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Version;

    #[test]
    fn test_idempotent() {
        let mut queue = Queue::new();
        queue.enqueue("a");
        queue.enqueue("b");
        queue.enqueue("a");
        assert_eq!(queue.handles(), ["a", "b"]);

        queue.dequeue("a");
        queue.dequeue("a");
        assert_eq!(queue.handles(), ["b"]);
    }

    #[test]
    fn test_args() {
        let mut queue = Queue::new();
        queue.enqueue("a?lang=en");
        assert!(queue.contains("a"));
        assert_eq!(queue.args("a"), Some("lang=en"));

        queue.dequeue("a");
        assert_eq!(queue.args("a"), None);
    }

    #[test]
    fn test_requires_transitive() {
        let mut registry = Registry::new();
        registry.add("a", Some("/a.js".into()), vec![], Version::Auto).unwrap();
        registry.add("b", Some("/b.js".into()), vec!["a".into()], Version::Auto).unwrap();
        registry.add("c", None, vec!["b".into()], Version::Auto).unwrap();
        registry.add("x", Some("/x.js".into()), vec![], Version::Auto).unwrap();

        let mut queue = Queue::new();
        queue.enqueue("c");

        assert!(queue.requires(&registry, "c"));
        assert!(queue.requires(&registry, "b"));
        assert!(queue.requires(&registry, "a"));
        assert!(!queue.requires(&registry, "x"));
    }
}

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use petgraph::Graph;
use petgraph::graph::NodeIndex;
use serde_json::Value;

use crate::asset::Asset;
use crate::core::Version;
use crate::error::RegistryError;

/// Mapping from handle to asset descriptor.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    assets: BTreeMap<String, Asset>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset.
    ///
    /// A handle that already has a concrete source is never overwritten. An
    /// alias may be replaced by a full registration.
    pub fn add(
        &mut self,
        handle: &str,
        src: Option<String>,
        deps: Vec<String>,
        ver: Version,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.assets.get(handle)
            && !existing.is_alias()
        {
            return Err(RegistryError::Duplicate(handle.to_string()));
        }

        tracing::debug!(handle, alias = src.is_none(), "registering asset");
        self.assets
            .insert(handle.to_string(), Asset::new(handle, src, deps, ver));

        Ok(())
    }

    pub fn add_data(&mut self, handle: &str, key: &str, value: Value) -> Result<(), RegistryError> {
        self.get_mut(handle)?.add_data(key, value);
        Ok(())
    }

    pub fn get_data(&self, handle: &str, key: &str) -> Option<&Value> {
        self.assets.get(handle)?.get_data(key)
    }

    pub fn get(&self, handle: &str) -> Option<&Asset> {
        self.assets.get(handle)
    }

    pub fn get_mut(&mut self, handle: &str) -> Result<&mut Asset, RegistryError> {
        self.assets
            .get_mut(handle)
            .ok_or_else(|| RegistryError::Unknown(handle.to_string()))
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.assets.contains_key(handle)
    }

    /// Remove an asset from the registry. Returns the removed descriptor.
    pub fn remove(&mut self, handle: &str) -> Option<Asset> {
        self.assets.remove(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Build the dependency graph. Edges point from a dependency to its
    /// dependent; dependencies that are not registered have no node.
    pub fn to_graph(&self) -> Graph<&str, ()> {
        let mut graph = Graph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for handle in self.assets.keys() {
            nodes.insert(handle.as_str(), graph.add_node(handle.as_str()));
        }

        for asset in self.assets.values() {
            let target = nodes[asset.handle.as_str()];
            for dep in &asset.deps {
                if let Some(&source) = nodes.get(dep.as_str()) {
                    graph.add_edge(source, target, ());
                }
            }
        }

        graph
    }

    /// Groups of handles that depend on each other in a cycle. The resolver
    /// tolerates these, this is only for reporting.
    pub fn cycles(&self) -> Vec<Vec<&str>> {
        let graph = self.to_graph();

        let mut cycles: Vec<Vec<&str>> = petgraph::algo::tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut names: Vec<_> = scc.into_iter().map(|i| graph[i]).collect();
                names.sort_unstable();
                names
            })
            .collect();

        cycles.sort();
        cycles
    }
}

/// Renders the registry as a Mermaid diagram.
impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.to_graph();

        writeln!(f, "graph LR")?;

        for index in graph.node_indices() {
            let handle = graph[index];
            let name = handle.replace('"', "\\\"");
            match self.assets[handle].is_alias() {
                true => writeln!(f, "    {:?}([\"{}\"])", index.index(), name)?,
                false => writeln!(f, "    {:?}[\"{}\"]", index.index(), name)?,
            }
        }

        for edge in graph.edge_indices() {
            let Some((source, target)) = graph.edge_endpoints(edge) else {
                continue;
            };
            writeln!(f, "    {:?} --> {:?}", source.index(), target.index())?;
        }

        Ok(())
    }
}

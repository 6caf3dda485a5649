//! Directed dependency graph of a target, for external renderers.

use crate::error::CraftError;
use crate::expand::{StructureCollector, expand};
use crate::registry::Registry;
use serde::Serialize;
use std::fmt::Write;

/// Item -> ingredient edges reachable from a root craftable. Quantities are
/// not part of the structure; each edge appears once no matter how many
/// recipe paths lead to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    root: String,
    /// Nodes in discovery order, root first.
    nodes: Vec<String>,
    edges: Vec<(String, String)>,
}

impl DependencyGraph {
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.edges.iter().any(|(a, b)| a == from && b == to)
    }

    /// Direct ingredients of `node`, in recipe order.
    pub fn successors<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .iter()
            .filter(move |(from, _)| from == node)
            .map(|(_, to)| to.as_str())
    }

    /// Graphviz `digraph` text.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "digraph {{");
        for node in &self.nodes {
            let _ = writeln!(out, "    \"{}\";", escape(node));
        }
        for (from, to) in &self.edges {
            let _ = writeln!(out, "    \"{}\" -> \"{}\";", escape(from), escape(to));
        }
        out.push_str("}\n");
        out
    }
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build the dependency graph rooted at `target`.
pub fn build_dependency_graph(
    registry: &Registry,
    target: &str,
) -> Result<DependencyGraph, CraftError> {
    let root = registry.craftable_id(target)?;
    let mut collector = StructureCollector::rooted_at(root);
    expand(registry, target, &mut collector)?;

    Ok(DependencyGraph {
        root: registry.name(root).to_string(),
        nodes: collector
            .nodes()
            .iter()
            .map(|&id| registry.name(id).to_string())
            .collect(),
        edges: collector
            .edges()
            .iter()
            .map(|&(from, to)| (registry.name(from).to_string(), registry.name(to).to_string()))
            .collect(),
    })
}

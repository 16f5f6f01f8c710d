//! Relation-expansion expressions for nested reads
//!
//! Dotted relation paths such as `user.patient.objet` and `user.customer`
//! are merged into a trie and emitted as the nested list literal the remote
//! store expects in its `look` parameter:
//! `["user",["patient",["objet"],"customer"]]`.
//!
//! A key is followed by a bracketed group only when it has children, so a
//! leaf never produces an empty `[]`.

use indexmap::IndexMap;

use crate::error::Result;

/// Ordered trie of relation paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTree {
    /// Root-level relations, in first-seen order
    nodes: IndexMap<String, RelationNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RelationNode {
    children: IndexMap<String, RelationNode>,
}

impl RelationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a list of dotted paths
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.add_path(path.as_ref());
        }
        tree
    }

    /// Merge one dotted path; prefixes already present are reused
    pub fn add_path(&mut self, path: &str) {
        let mut nodes = &mut self.nodes;
        for segment in path.split('.').map(str::trim).filter(|s| !s.is_empty()) {
            nodes = &mut nodes.entry(segment.to_string()).or_default().children;
        }
    }

    /// Check if the tree is empty (no expansion needed)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Emit the expansion expression, or `None` when there is nothing to expand
    pub fn encode(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut out = String::new();
        Self::encode_group(&self.nodes, &mut out);
        Some(out)
    }

    fn encode_group(nodes: &IndexMap<String, RelationNode>, out: &mut String) {
        out.push('[');
        for (i, (key, node)) in nodes.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&quote(key));
            if !node.children.is_empty() {
                out.push(',');
                Self::encode_group(&node.children, out);
            }
        }
        out.push(']');
    }

    /// Parse an expression produced by [`RelationTree::encode`]
    pub fn parse(expression: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(expression)?;
        let mut tree = Self::new();
        if let serde_json::Value::Array(items) = json {
            Self::parse_group(&items, &mut tree.nodes);
        }
        Ok(tree)
    }

    fn parse_group(items: &[serde_json::Value], nodes: &mut IndexMap<String, RelationNode>) {
        let mut last: Option<String> = None;
        for item in items {
            match item {
                serde_json::Value::String(key) => {
                    nodes.entry(key.clone()).or_default();
                    last = Some(key.clone());
                }
                serde_json::Value::Array(children) => {
                    if let Some(node) = last.as_ref().and_then(|key| nodes.get_mut(key)) {
                        Self::parse_group(children, &mut node.children);
                    }
                }
                _ => {}
            }
        }
    }

    /// Every full path of the tree, depth-first
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        Self::collect_paths(&self.nodes, "", &mut paths);
        paths
    }

    fn collect_paths(nodes: &IndexMap<String, RelationNode>, prefix: &str, paths: &mut Vec<String>) {
        for (key, node) in nodes {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            if node.children.is_empty() {
                paths.push(path);
            } else {
                Self::collect_paths(&node.children, &path, paths);
            }
        }
    }
}

fn quote(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}

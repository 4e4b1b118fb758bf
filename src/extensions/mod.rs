//! Shadow extensions tree
//!
//! An arena of nodes mirroring the branching of the generated CRD schema.
//! Nodes carry only annotation payloads such as `x-kubernetes-mapping` and
//! `x-openapi-mapping`. The converter allocates one node per visited schema
//! node and links it under its parent once the schema node survives, so the
//! two trees cannot drift apart when property plugins drop branches.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Annotation describing how a field maps to another Kubernetes object
pub const KUBERNETES_MAPPING: &str = "x-kubernetes-mapping";

/// Annotation describing how a field maps back to the source API
pub const OPENAPI_MAPPING: &str = "x-openapi-mapping";

/// Index of a node in an [`ExtensionsTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
pub struct ExtensionsNode {
    pub extensions: BTreeMap<String, Value>,
    pub properties: BTreeMap<String, NodeId>,
    pub items: Option<NodeId>,
}

/// Arena holding the extensions tree of one CRD
#[derive(Debug, Clone)]
pub struct ExtensionsTree {
    nodes: Vec<ExtensionsNode>,
}

impl Default for ExtensionsTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionsTree {
    /// A tree holding only an empty root
    pub fn new() -> Self {
        Self {
            nodes: vec![ExtensionsNode::default()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Allocate a detached node
    pub fn alloc(&mut self) -> NodeId {
        self.nodes.push(ExtensionsNode::default());
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &ExtensionsNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ExtensionsNode {
        &mut self.nodes[id.0]
    }

    /// Link `child` under `parent` as property `key`, replacing any previous link
    pub fn attach(&mut self, parent: NodeId, key: impl Into<String>, child: NodeId) {
        self.node_mut(parent).properties.insert(key.into(), child);
    }

    /// Property child of `parent`, created if missing
    pub fn child(&mut self, parent: NodeId, key: &str) -> NodeId {
        if let Some(id) = self.node(parent).properties.get(key) {
            return *id;
        }
        let id = self.alloc();
        self.attach(parent, key, id);
        id
    }

    /// Existing property child of `parent`
    pub fn get_child(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.node(parent).properties.get(key).copied()
    }

    /// Follow a chain of property keys, creating missing nodes
    pub fn descend(&mut self, from: NodeId, keys: &[&str]) -> NodeId {
        keys.iter().fold(from, |node, key| self.child(node, key))
    }

    /// Array items child of `parent`, created if missing
    pub fn items(&mut self, parent: NodeId) -> NodeId {
        if let Some(id) = self.node(parent).items {
            return id;
        }
        let id = self.alloc();
        self.node_mut(parent).items = Some(id);
        id
    }

    pub fn set_extension(&mut self, node: NodeId, key: impl Into<String>, value: Value) {
        self.node_mut(node).extensions.insert(key.into(), value);
    }

    pub fn extension(&self, node: NodeId, key: &str) -> Option<&Value> {
        self.node(node).extensions.get(key)
    }

    /// Unlink every branch below `node` that carries no extensions.
    ///
    /// Returns whether `node` or any descendant still carries an extension.
    pub fn prune(&mut self, node: NodeId) -> bool {
        let children: Vec<(String, NodeId)> = self
            .node(node)
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();

        let mut keep = Vec::new();
        for (key, child) in children {
            if self.prune(child) {
                keep.push((key, child));
            }
        }

        let items = self.node(node).items;
        let keep_items = items.map(|id| self.prune(id)).unwrap_or(false);

        let entry = self.node_mut(node);
        entry.properties = keep.into_iter().collect();
        if !keep_items {
            entry.items = None;
        }

        !entry.extensions.is_empty() || !entry.properties.is_empty() || entry.items.is_some()
    }

    /// Render the subtree at `node` as an OpenAPI-shaped JSON document
    pub fn to_value(&self, node: NodeId) -> Value {
        let entry = self.node(node);
        let mut object = Map::new();

        for (key, value) in &entry.extensions {
            object.insert(key.clone(), value.clone());
        }

        if !entry.properties.is_empty() {
            let properties: Map<String, Value> = entry
                .properties
                .iter()
                .map(|(key, child)| (key.clone(), self.to_value(*child)))
                .collect();
            object.insert("properties".to_string(), Value::Object(properties));
        }

        if let Some(items) = entry.items {
            object.insert("items".to_string(), self.to_value(items));
        }

        Value::Object(object)
    }

    /// Prune the whole tree and serialize it compactly, `None` if nothing survives
    pub fn into_annotation(mut self) -> Result<Option<String>, serde_json::Error> {
        let root = self.root();
        if !self.prune(root) {
            return Ok(None);
        }
        serde_json::to_string(&self.to_value(root)).map(Some)
    }
}

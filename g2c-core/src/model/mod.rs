/*!
Provides the Rust types that implement the grammar document model.

The document is an arena of nodes addressed by [`NodeId`]: each node is
either an element (qualified name, attributes, ordered children) or a
literal text block. The fixed root is the *derivations list* whose children
are the top-level rules. Removal tombstones the arena slot and detaches the
id from its parent's child list; slots are never reused or compacted, so
ids captured before a rewrite stay valid (and report themselves as removed)
while the rewrite mutates siblings.

The model is mutated only by the [`normalize`] pipeline; both walkers treat
it as read-only afterwards.

*/

use crate::syntax::{ATTR_TYPE, NAME_COPY, NAME_OR};
use std::fmt::Display;
use std::path::{Path, PathBuf};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// An index into a [`Grammar`]'s node arena.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

///
/// The payload of a node: an element or a literal text block.
///
#[derive(Clone, Debug)]
pub enum NodeValue {
    /// An element, identified by its qualified name as written.
    Element(String),
    /// Literal character data, kept verbatim.
    Text(String),
}

///
/// The computed classification of a node; never stored, classification is
/// cheap and the tree mutates only during normalization.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An empty element referencing another derivation.
    Call,
    /// A container with at least one `or` child.
    Categorical,
    /// A container with a child of its own name.
    Recursive,
    /// An empty element with a `type` attribute.
    Range,
    /// A `gr:copy` directive.
    Copy,
    /// A literal text block.
    Cdata,
    /// Any other container.
    Plain,
}

///
/// A grammar document: the derivations list and every node below it.
///
#[derive(Clone, Debug)]
pub struct Grammar {
    nodes: Vec<NodeData>,
    root: NodeId,
    base_path: PathBuf,
}

// ------------------------------------------------------------------------------------------------
// Private Types
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct NodeData {
    value: NodeValue,
    attributes: Vec<(String, String)>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    removed: bool,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Grammar {
    /// Create an empty grammar whose copy directives resolve against `base_path`.
    pub fn new<P>(base_path: P) -> Self
    where
        P: AsRef<Path>,
    {
        let mut nodes = Vec::new();
        nodes.push(NodeData {
            value: NodeValue::Element(crate::syntax::NAME_DERIVATIONS.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            removed: false,
        });
        Self {
            nodes,
            root: NodeId(0),
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// The derivations list node.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The directory the grammar was loaded from.
    #[inline]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    // --------------------------------------------------------------------------------------------
    // Node Construction
    // --------------------------------------------------------------------------------------------

    /// Create a detached element node.
    pub fn new_element<S>(&mut self, name: S) -> NodeId
    where
        S: Into<String>,
    {
        self.push(NodeData {
            value: NodeValue::Element(name.into()),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            removed: false,
        })
    }

    /// Create a detached text block.
    pub fn new_text<S>(&mut self, content: S) -> NodeId
    where
        S: Into<String>,
    {
        self.push(NodeData {
            value: NodeValue::Text(content.into()),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            removed: false,
        })
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        id
    }

    // --------------------------------------------------------------------------------------------
    // Node Accessors
    // --------------------------------------------------------------------------------------------

    /// The element name, or the empty string for a text block.
    #[inline]
    pub fn name(&self, node: NodeId) -> &str {
        match &self.nodes[node.0].value {
            NodeValue::Element(name) => name,
            NodeValue::Text(_) => "",
        }
    }

    /// The text content, if this node is a text block.
    #[inline]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].value {
            NodeValue::Element(_) => None,
            NodeValue::Text(content) => Some(content),
        }
    }

    #[inline]
    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].value, NodeValue::Element(_))
    }

    #[inline]
    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].value, NodeValue::Text(_))
    }

    /// Whether the node is still attached to the document.
    #[inline]
    pub fn is_alive(&self, node: NodeId) -> bool {
        !self.nodes[node.0].removed
    }

    #[inline]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    #[inline]
    pub fn has_children(&self, node: NodeId) -> bool {
        !self.nodes[node.0].children.is_empty()
    }

    #[inline]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    #[inline]
    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        &self.nodes[node.0].attributes
    }

    #[inline]
    pub fn has_attributes(&self, node: NodeId) -> bool {
        !self.nodes[node.0].attributes.is_empty()
    }

    /// The value of the named attribute, if present.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0]
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The sibling immediately before `node`, text blocks included.
    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&id| id == node)?;
        if index == 0 {
            None
        } else {
            Some(siblings[index - 1])
        }
    }

    /// The sibling immediately after `node`, text blocks included.
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&id| id == node)?;
        siblings.get(index + 1).copied()
    }

    // --------------------------------------------------------------------------------------------
    // Node Mutators
    // --------------------------------------------------------------------------------------------

    pub fn set_name<S>(&mut self, node: NodeId, name: S)
    where
        S: Into<String>,
    {
        if let NodeValue::Element(existing) = &mut self.nodes[node.0].value {
            *existing = name.into();
        }
    }

    pub fn set_text<S>(&mut self, node: NodeId, content: S)
    where
        S: Into<String>,
    {
        if let NodeValue::Text(existing) = &mut self.nodes[node.0].value {
            *existing = content.into();
        }
    }

    pub fn set_attribute<S1, S2>(&mut self, node: NodeId, name: S1, value: S2)
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let name = name.into();
        let attributes = &mut self.nodes[node.0].attributes;
        if let Some(entry) = attributes.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value.into();
        } else {
            attributes.push((name, value.into()));
        }
    }

    /// Attach a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Attach a detached node immediately before `anchor` under its parent.
    pub fn insert_before(&mut self, anchor: NodeId, child: NodeId) {
        let parent = self.parent(anchor).expect("anchor has no parent");
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|&id| id == anchor)
            .expect("anchor not among parent's children");
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
    }

    /// Attach a detached node immediately after `anchor` under its parent.
    pub fn insert_after(&mut self, anchor: NodeId, child: NodeId) {
        let parent = self.parent(anchor).expect("anchor has no parent");
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|&id| id == anchor)
            .expect("anchor not among parent's children");
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index + 1, child);
    }

    /// Detach `node` from its parent and tombstone its whole subtree.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            self.nodes[parent.0].children.retain(|&id| id != node);
        }
        self.tombstone(node);
    }

    fn tombstone(&mut self, node: NodeId) {
        self.nodes[node.0].removed = true;
        self.nodes[node.0].parent = None;
        for child in self.nodes[node.0].children.clone() {
            self.tombstone(child);
        }
    }

    /// Deep-copy a subtree within this arena; the copy is detached.
    pub fn deep_copy(&mut self, node: NodeId) -> NodeId {
        let data = NodeData {
            value: self.nodes[node.0].value.clone(),
            attributes: self.nodes[node.0].attributes.clone(),
            children: Vec::new(),
            parent: None,
            removed: false,
        };
        let copy = self.push(data);
        for child in self.nodes[node.0].children.clone() {
            let child_copy = self.deep_copy(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Deep-copy a subtree from another grammar; the copy is detached.
    pub fn import_from(&mut self, other: &Grammar, node: NodeId) -> NodeId {
        let data = NodeData {
            value: other.nodes[node.0].value.clone(),
            attributes: other.nodes[node.0].attributes.clone(),
            children: Vec::new(),
            parent: None,
            removed: false,
        };
        let copy = self.push(data);
        for &child in other.children(node) {
            let child_copy = self.import_from(other, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    // --------------------------------------------------------------------------------------------
    // Queries
    // --------------------------------------------------------------------------------------------

    /// The top-level derivations, in document order.
    pub fn derivations(&self) -> Vec<NodeId> {
        self.children(self.root).to_vec()
    }

    /// The top-level derivations with the given name.
    pub fn derivations_named(&self, name: &str) -> Vec<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .filter(|&id| self.name(id) == name)
            .collect()
    }

    /// All nodes at or below the top-level derivations, in document order.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for derivation in self.derivations() {
            out.push(derivation);
            self.collect_descendants(derivation, &mut out);
        }
        out
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(node) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Every element with the given name at or below the derivations list.
    pub fn elements_named(&self, name: &str) -> Vec<NodeId> {
        self.all_nodes()
            .into_iter()
            .filter(|&id| self.is_element(id) && self.name(id) == name)
            .collect()
    }

    /// Every call site of the named derivation: a childless, attributeless
    /// element of that name anywhere at or below the derivations list.
    pub fn call_sites(&self, name: &str) -> Vec<NodeId> {
        self.elements_named(name)
            .into_iter()
            .filter(|&id| !self.has_children(id) && !self.has_attributes(id))
            .collect()
    }

    /// Split a container's children into alternatives on its `or` separators.
    pub fn alternatives(&self, node: NodeId) -> Vec<Vec<NodeId>> {
        let mut out = vec![Vec::new()];
        for &child in self.children(node) {
            if self.name(child) == NAME_OR {
                out.push(Vec::new());
            } else {
                out.last_mut().expect("non-empty").push(child);
            }
        }
        out
    }

    /// The number of `or` children of a container.
    pub fn or_count(&self, node: NodeId) -> usize {
        self.children(node)
            .iter()
            .filter(|&&child| self.name(child) == NAME_OR)
            .count()
    }

    // --------------------------------------------------------------------------------------------
    // Classification
    // --------------------------------------------------------------------------------------------

    /// Classify a node; the decision order mirrors the walker's dispatch.
    pub fn kind(&self, node: NodeId) -> NodeKind {
        let has_children = self.has_children(node);
        let has_attributes = self.has_attributes(node);
        if self.is_element(node) {
            if !has_children && !has_attributes && self.name(node) != NAME_OR {
                return NodeKind::Call;
            }
            if !has_children
                && has_attributes
                && self.attribute(node, ATTR_TYPE).is_some_and(|t| !t.is_empty())
            {
                return NodeKind::Range;
            }
            if self.name(node) == NAME_COPY {
                return NodeKind::Copy;
            }
        } else {
            return NodeKind::Cdata;
        }
        if has_children {
            let name = self.name(node);
            if self
                .children(node)
                .iter()
                .any(|&child| self.is_element(child) && self.name(child) == name)
            {
                return NodeKind::Recursive;
            }
        }
        if self
            .children(node)
            .iter()
            .any(|&child| self.name(child) == NAME_OR)
        {
            return NodeKind::Categorical;
        }
        NodeKind::Plain
    }

    // --------------------------------------------------------------------------------------------
    // Rendering
    // --------------------------------------------------------------------------------------------

    /// Render a subtree as XML-ish text, mostly for diagnostics and tests.
    pub fn node_to_string(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node);
        out
    }

    fn write_node(&self, out: &mut String, node: NodeId) {
        match &self.nodes[node.0].value {
            NodeValue::Text(content) => {
                out.push_str("<![CDATA[");
                out.push_str(content);
                out.push_str("]]>");
            }
            NodeValue::Element(name) => {
                out.push('<');
                out.push_str(name);
                for (key, value) in &self.nodes[node.0].attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(value);
                    out.push('"');
                }
                if self.has_children(node) {
                    out.push('>');
                    for &child in self.children(node) {
                        self.write_node(out, child);
                    }
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                } else {
                    out.push_str("/>");
                }
            }
        }
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "<{}>", crate::syntax::NAME_DERIVATIONS)?;
        for derivation in self.derivations() {
            writeln!(f, "  {}", self.node_to_string(derivation))?;
        }
        writeln!(f, "</{}>", crate::syntax::NAME_DERIVATIONS)
    }
}

// ------------------------------------------------------------------------------------------------
// Modules
// ------------------------------------------------------------------------------------------------

pub mod normalize;

pub mod paths;

pub mod walk;

// Autolog
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Arena-backed syntax snapshot
//!
//! The host lowers its parsed sources into a [`SyntaxTree`]: a flat arena of
//! [`SyntaxNode`]s stored in pre-order. A [`NodeId`] is only meaningful for the
//! tree that issued it, and a [`NodeRef`] borrows the tree so it cannot outlive
//! the snapshot it points into.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node inside one [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in traversal order
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Syntactic category of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root of one source file
    SourceFile,
    /// Inline or file-backed module
    Module,
    Struct,
    Enum,
    Union,
    Trait,
    /// `impl` block; its name is the last segment of the self type
    Impl,
    /// Struct or union field
    Field,
    /// Function inside an `impl` or `trait`
    Method,
    /// Associated constant inside an `impl` or `trait`
    AssociatedConst,
    /// Free function
    Function,
    Const,
    Static,
    /// Anything the host lowers but the pipeline never inspects
    Other,
}

impl NodeKind {
    /// Whether the node declares something that can carry a marker
    pub fn is_declaration_like(self) -> bool {
        !matches!(self, Self::SourceFile | Self::Other)
    }

    /// Whether the node is a type declaration that can own generated members
    pub fn is_type_declaration(self) -> bool {
        matches!(self, Self::Struct | Self::Enum | Self::Union)
    }

    /// Whether the node is a scope whose owner receives member augmentations
    pub fn is_owner_scope(self) -> bool {
        self.is_type_declaration() || self == Self::Impl
    }

    /// Whether the upward owner search must stop at this node
    pub fn is_scope_boundary(self) -> bool {
        matches!(self, Self::SourceFile | Self::Module | Self::Trait | Self::Function)
    }

    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceFile => "source_file",
            Self::Module => "module",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::Trait => "trait",
            Self::Impl => "impl",
            Self::Field => "field",
            Self::Method => "method",
            Self::AssociatedConst => "associated_const",
            Self::Function => "function",
            Self::Const => "const",
            Self::Static => "static",
            Self::Other => "other",
        }
    }
}

/// File and line a node was lowered from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self { file: file.into(), line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An attribute as written in the source, before any name resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSyntax {
    /// Path segments exactly as spelled, e.g. `["autolog", "auto_log_class"]`
    pub segments: Vec<String>,
    /// Whether the path was written with a leading `::`
    pub leading_colon: bool,
}

impl AttributeSyntax {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            leading_colon: false,
        }
    }

    /// Parse a `::`-separated spelling such as `"::autolog::auto_log_class"`
    pub fn parse(spelling: &str) -> Self {
        let leading_colon = spelling.starts_with("::");
        let mut attr = Self::new(spelling.trim_start_matches("::").split("::").filter(|s| !s.is_empty()));
        attr.leading_colon = leading_colon;
        attr
    }

    /// The written spelling, used for logging only
    pub fn spelling(&self) -> String {
        let joined = self.segments.join("::");
        if self.leading_colon { format!("::{}", joined) } else { joined }
    }
}

/// One node of the snapshot
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Declared identifier, if the construct has one
    pub name: Option<String>,
    pub parent: Option<NodeId>,
    pub attributes: Vec<AttributeSyntax>,
    pub location: Option<SourceLocation>,
}

impl SyntaxNode {
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// Immutable arena of nodes in pre-order
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Start building a tree
    pub fn builder() -> SyntaxTreeBuilder {
        SyntaxTreeBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    ///
    /// Panics if `id` was issued by a different tree and is out of range.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    /// Checked lookup
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Borrowing handle to a node
    pub fn node_ref(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// All node ids in traversal order
    pub fn node_ids(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).and_then(|n| n.parent),
        }
    }
}

/// Iterator over the parent chain of a node
pub struct Ancestors<'t> {
    tree: &'t SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.get(current).and_then(|n| n.parent);
        Some(current)
    }
}

/// Non-owning reference into a snapshot, valid for the snapshot's lifetime only
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &'t SyntaxNode {
        self.tree.node(self.id)
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef").field("id", &self.id).field("kind", &self.node().kind).finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

/// Stack-based builder producing nodes in pre-order.
///
/// [`open`](Self::open) pushes a node that becomes the parent of everything
/// added until the matching [`close`](Self::close).
#[derive(Debug, Default)]
pub struct SyntaxTreeBuilder {
    nodes: Vec<SyntaxNode>,
    open: Vec<NodeId>,
}

impl SyntaxTreeBuilder {
    /// Add a node under the currently open node without opening it
    pub fn leaf(&mut self, kind: NodeKind, name: Option<&str>, attributes: Vec<AttributeSyntax>, location: Option<SourceLocation>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            kind,
            name: name.map(str::to_owned),
            parent: self.open.last().copied(),
            attributes,
            location,
        });
        id
    }

    /// Add a node and make it the parent of subsequent nodes
    pub fn open(&mut self, kind: NodeKind, name: Option<&str>, attributes: Vec<AttributeSyntax>, location: Option<SourceLocation>) -> NodeId {
        let id = self.leaf(kind, name, attributes, location);
        self.open.push(id);
        id
    }

    /// Close the most recently opened node
    pub fn close(&mut self) -> Option<NodeId> {
        self.open.pop()
    }

    /// Finish the tree; unclosed nodes are closed implicitly
    pub fn finish(self) -> SyntaxTree {
        SyntaxTree { nodes: self.nodes }
    }
}

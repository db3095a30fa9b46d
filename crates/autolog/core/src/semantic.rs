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

//! Semantic model seam
//!
//! The host answers two questions about its snapshot: which symbol an
//! attribute path denotes, and which symbol a declaration declares. Marker
//! matching only ever compares resolved [`SymbolPath`]s, never spellings.

use crate::syntax::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Canonical, fully qualified identity of a symbol.
///
/// Crate-local items are rooted at `crate` (`crate::ui::Widget`), external
/// items start with their crate name (`autolog::auto_log_class`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolPath(String);

impl SymbolPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = segments.into_iter().map(|s| s.as_ref().to_owned()).collect();
        Self(joined.join("::"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }
}

impl fmt::Display for SymbolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespace that contains a declared symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainingNamespace {
    /// The host's "no namespace" sentinel (the crate root)
    Global,
    /// A `::`-joined module path relative to the crate root, e.g. `ui::widgets`
    Named(String),
}

impl ContainingNamespace {
    /// Plain namespace string, with the global sentinel mapped to `""`
    pub fn normalized(&self) -> String {
        match self {
            Self::Global => String::new(),
            Self::Named(path) => path.clone(),
        }
    }
}

/// Metadata of a declared symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclaredSymbol {
    pub name: String,
    pub namespace: ContainingNamespace,
    /// Declared with type or const parameters; an extension cannot name it without them
    #[serde(default)]
    pub generic: bool,
}

impl DeclaredSymbol {
    pub fn new(name: impl Into<String>, namespace: ContainingNamespace) -> Self {
        Self {
            name: name.into(),
            namespace,
            generic: false,
        }
    }

    pub fn with_generics(mut self) -> Self {
        self.generic = true;
        self
    }
}

/// Read-only semantic view of one snapshot
#[cfg_attr(test, mockall::automock)]
pub trait SemanticModel {
    /// Resolve the `index`-th attribute of `node` to the symbol it names.
    ///
    /// `None` means the reference could not be resolved (builtin attribute,
    /// missing import, partial compilation).
    fn resolve_attribute(&self, node: NodeId, index: usize) -> Option<SymbolPath>;

    /// Symbol declared by `node`; for an `impl` block, the symbol of its self type
    fn declared_symbol(&self, node: NodeId) -> Option<DeclaredSymbol>;
}

/// Semantic model with every answer computed up front.
///
/// Useful for hosts that resolve eagerly, and for tests.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    attributes: HashMap<(NodeId, usize), SymbolPath>,
    declarations: HashMap<NodeId, DeclaredSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record what the `index`-th attribute of `node` resolves to
    pub fn bind_attribute(&mut self, node: NodeId, index: usize, symbol: SymbolPath) -> &mut Self {
        self.attributes.insert((node, index), symbol);
        self
    }

    /// Record the symbol `node` declares
    pub fn declare(&mut self, node: NodeId, symbol: DeclaredSymbol) -> &mut Self {
        self.declarations.insert(node, symbol);
        self
    }
}

impl SemanticModel for SymbolTable {
    fn resolve_attribute(&self, node: NodeId, index: usize) -> Option<SymbolPath> {
        self.attributes.get(&(node, index)).cloned()
    }

    fn declared_symbol(&self, node: NodeId) -> Option<DeclaredSymbol> {
        self.declarations.get(&node).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{NodeKind, SyntaxTree};

    #[test]
    fn test_global_namespace_normalizes_to_empty() {
        assert_eq!(ContainingNamespace::Global.normalized(), "");
        assert_eq!(ContainingNamespace::Named("ui::widgets".into()).normalized(), "ui::widgets");
    }

    #[test]
    fn test_symbol_path_segments() {
        let path = SymbolPath::from_segments(["crate", "ui", "Widget"]);
        assert_eq!(path.as_str(), "crate::ui::Widget");
        assert_eq!(path.name(), "Widget");
        assert_eq!(SymbolPath::new("autolog").name(), "autolog");
    }

    #[test]
    fn test_symbol_table_lookup() {
        let mut builder = SyntaxTree::builder();
        let node = builder.leaf(NodeKind::Struct, Some("Widget"), vec![], None);
        let _tree = builder.finish();

        let mut table = SymbolTable::new();
        table
            .bind_attribute(node, 0, SymbolPath::new("autolog::auto_log_class"))
            .declare(node, DeclaredSymbol::new("Widget", ContainingNamespace::Global));

        assert_eq!(table.resolve_attribute(node, 0), Some(SymbolPath::new("autolog::auto_log_class")));
        assert_eq!(table.resolve_attribute(node, 1), None);
        assert_eq!(table.declared_symbol(node).map(|s| s.name), Some("Widget".to_string()));
    }
}

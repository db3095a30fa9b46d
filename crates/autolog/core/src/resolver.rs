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

//! Semantic resolution of candidate nodes into findings
//!
//! Each attribute on a candidate is resolved through the [`SemanticModel`] and
//! looked up in the [`MarkerRegistry`]. The first recognized marker wins; later
//! recognized markers on the same node are reported, not applied. Nothing in
//! here fails: every problem degrades to "no finding" plus, where the user can
//! act on it, a [`Diagnostic`].

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::registry::{MarkerEntry, MarkerKind, MarkerRegistry, MemberRole};
use crate::semantic::{SemanticModel, SymbolPath};
use crate::syntax::{NodeId, NodeRef, SourceLocation, SyntaxTree};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What a finding asks the emitter to generate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Augmentation {
    /// Augment the owner itself
    Declaration,
    /// Augment one named member of the owner
    Member { name: String, role: MemberRole },
}

impl Augmentation {
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::Declaration => None,
            Self::Member { name, .. } => Some(name),
        }
    }

    pub fn kind(&self) -> MarkerKind {
        match self {
            Self::Declaration => MarkerKind::Declaration,
            Self::Member { role, .. } => MarkerKind::Member(*role),
        }
    }
}

/// A matched marker, still tied to the snapshot through `owner`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding<'t> {
    pub owner: NodeRef<'t>,
    /// `None` when neither the model nor the syntax names the owner
    pub owner_name: Option<String>,
    /// Module path of the owner, `""` at the crate root
    pub owner_namespace: String,
    pub augmentation: Augmentation,
    pub marker: SymbolPath,
    pub location: Option<SourceLocation>,
}

/// Result of resolving one candidate
#[derive(Debug, Default)]
pub struct Resolution<'t> {
    pub finding: Option<Finding<'t>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves candidate nodes of one snapshot
pub struct Resolver<'a, M: ?Sized> {
    tree: &'a SyntaxTree,
    model: &'a M,
    registry: &'a MarkerRegistry,
}

impl<'a, M: SemanticModel + ?Sized> Resolver<'a, M> {
    pub fn new(tree: &'a SyntaxTree, model: &'a M, registry: &'a MarkerRegistry) -> Self {
        Self { tree, model, registry }
    }

    /// Resolve `node` to at most one finding
    pub fn resolve(&self, node: NodeId) -> Option<Finding<'a>> {
        self.resolve_candidate(node).finding
    }

    /// Resolve `node`, keeping the diagnostics raised along the way
    pub fn resolve_candidate(&self, id: NodeId) -> Resolution<'a> {
        let mut resolution = Resolution::default();
        let Some(node) = self.tree.get(id) else {
            return resolution;
        };

        let mut matched: Option<&MarkerEntry> = None;
        for (index, attribute) in node.attributes.iter().enumerate() {
            let Some(identity) = self.model.resolve_attribute(id, index) else {
                trace!(node = %id, attribute = %attribute.spelling(), "attribute did not resolve");
                continue;
            };
            let Some(entry) = self.registry.lookup(&identity) else {
                trace!(node = %id, identity = %identity, "not a registered marker");
                continue;
            };
            if !entry.applies_to(node.kind) {
                resolution.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::MisplacedMarker,
                        format!("`{}` cannot be applied to a {} declaration", identity, node.kind.as_str()),
                    )
                    .with_location(node.location.clone()),
                );
                continue;
            }
            match matched {
                None => matched = Some(entry),
                Some(first) => resolution.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::ConflictingMarkers,
                        format!("`{}` is ignored because `{}` already applies to this declaration", identity, first.identity),
                    )
                    .with_location(node.location.clone()),
                ),
            }
        }

        let Some(entry) = matched else {
            return resolution;
        };

        let augmentation = match entry.kind {
            MarkerKind::Declaration => Augmentation::Declaration,
            MarkerKind::Member(role) => match &node.name {
                Some(name) => Augmentation::Member { name: name.clone(), role },
                None => {
                    trace!(node = %id, "member marker on an unnamed declaration");
                    return resolution;
                }
            },
        };

        let Some(owner) = self.find_owner(id) else {
            resolution.diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::OwnerNotFound,
                    format!("`{}` on `{}` has no enclosing type or impl to extend", entry.identity, node.name.as_deref().unwrap_or("_")),
                )
                .with_location(node.location.clone()),
            );
            return resolution;
        };

        let declared = self.model.declared_symbol(owner);
        if let Some(symbol) = declared.as_ref().filter(|symbol| symbol.generic) {
            resolution.diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::GenericOwner,
                    format!("`{}` on `{}` is ignored because `{}` is generic", entry.identity, node.name.as_deref().unwrap_or("_"), symbol.name),
                )
                .with_location(node.location.clone()),
            );
            return resolution;
        }

        // an impl's spelled self type is not a merge target unless the model vouches for it
        let owner_node = self.tree.node(owner);
        let owner_name = match declared.as_ref() {
            Some(symbol) => Some(symbol.name.clone()),
            None if owner_node.kind.is_type_declaration() => owner_node.name.clone(),
            None => None,
        };
        let owner_namespace = declared.map(|symbol| symbol.namespace.normalized()).unwrap_or_default();

        resolution.finding = Some(Finding {
            owner: self.tree.node_ref(owner),
            owner_name,
            owner_namespace,
            augmentation,
            marker: entry.identity.clone(),
            location: node.location.clone(),
        });
        resolution
    }

    /// The node itself when it is an owner scope, else the nearest enclosing one
    fn find_owner(&self, id: NodeId) -> Option<NodeId> {
        if self.tree.node(id).kind.is_owner_scope() {
            return Some(id);
        }
        for ancestor in self.tree.ancestors(id) {
            let kind = self.tree.node(ancestor).kind;
            if kind.is_owner_scope() {
                return Some(ancestor);
            }
            if kind.is_scope_boundary() {
                return None;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{ContainingNamespace, DeclaredSymbol, MockSemanticModel, SymbolTable};
    use crate::syntax::{AttributeSyntax, NodeKind};
    use mockall::predicate::eq;

    fn attr(spelling: &str) -> Vec<AttributeSyntax> {
        vec![AttributeSyntax::parse(spelling)]
    }

    #[test]
    fn test_declaration_marker_owner_is_node() {
        let mut builder = SyntaxTree::builder();
        builder.open(NodeKind::SourceFile, None, vec![], None);
        let widget = builder.leaf(NodeKind::Struct, Some("Widget"), attr("auto_log_class"), None);
        let tree = builder.finish();

        let mut model = SymbolTable::new();
        model
            .bind_attribute(widget, 0, SymbolPath::new("autolog::auto_log_class"))
            .declare(widget, DeclaredSymbol::new("Widget", ContainingNamespace::Named("ui".into())));
        let registry = MarkerRegistry::autolog();

        let finding = Resolver::new(&tree, &model, &registry).resolve(widget).unwrap();
        assert_eq!(finding.owner.id(), widget);
        assert_eq!(finding.owner_name.as_deref(), Some("Widget"));
        assert_eq!(finding.owner_namespace, "ui");
        assert_eq!(finding.augmentation, Augmentation::Declaration);
    }

    #[test]
    fn test_method_marker_walks_to_impl() {
        let mut builder = SyntaxTree::builder();
        builder.open(NodeKind::SourceFile, None, vec![], None);
        let imp = builder.open(NodeKind::Impl, Some("Widget"), vec![], None);
        let render = builder.leaf(NodeKind::Method, Some("render"), attr("logged"), None);
        let tree = builder.finish();

        let mut model = SymbolTable::new();
        model
            .bind_attribute(render, 0, SymbolPath::new("autolog::auto_log_method"))
            .declare(imp, DeclaredSymbol::new("Widget", ContainingNamespace::Global));
        let registry = MarkerRegistry::autolog();

        let finding = Resolver::new(&tree, &model, &registry).resolve(render).unwrap();
        assert_eq!(finding.owner.id(), imp);
        assert_eq!(finding.owner_namespace, "");
        assert_eq!(finding.augmentation.member_name(), Some("render"));
        assert_eq!(finding.augmentation.kind(), MarkerKind::Member(MemberRole::Method));
    }

    #[test]
    fn test_unresolvable_attribute_is_skipped() {
        let mut builder = SyntaxTree::builder();
        let widget = builder.leaf(NodeKind::Struct, Some("Widget"), vec![AttributeSyntax::parse("derive"), AttributeSyntax::parse("auto_log_class")], None);
        let tree = builder.finish();

        let mut model = MockSemanticModel::new();
        model.expect_resolve_attribute().with(eq(widget), eq(0)).return_const(None::<SymbolPath>);
        model.expect_resolve_attribute().with(eq(widget), eq(1)).return_const(Some(SymbolPath::new("autolog::auto_log_class")));
        model.expect_declared_symbol().return_const(None::<DeclaredSymbol>);
        let registry = MarkerRegistry::autolog();

        let resolution = Resolver::new(&tree, &model, &registry).resolve_candidate(widget);
        let finding = resolution.finding.unwrap();
        assert_eq!(finding.owner_name.as_deref(), Some("Widget"));
        assert_eq!(finding.owner_namespace, "");
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_same_spelling_different_identity_does_not_match() {
        let mut builder = SyntaxTree::builder();
        let widget = builder.leaf(NodeKind::Struct, Some("Widget"), attr("auto_log_class"), None);
        let tree = builder.finish();

        let mut model = MockSemanticModel::new();
        model.expect_resolve_attribute().return_const(Some(SymbolPath::new("crate::fake::auto_log_class")));
        model.expect_declared_symbol().never();
        let registry = MarkerRegistry::autolog();

        assert!(Resolver::new(&tree, &model, &registry).resolve(widget).is_none());
    }

    #[test]
    fn test_first_match_wins_and_conflict_is_reported() {
        let mut builder = SyntaxTree::builder();
        let custom = SymbolPath::new("trace_kit::traced_type");
        let widget = builder.leaf(NodeKind::Struct, Some("Widget"), vec![AttributeSyntax::parse("a"), AttributeSyntax::parse("b")], None);
        let tree = builder.finish();

        let mut model = SymbolTable::new();
        model.bind_attribute(widget, 0, SymbolPath::new("autolog::auto_log_class")).bind_attribute(widget, 1, custom.clone());
        let registry = MarkerRegistry::builder()
            .register(SymbolPath::new("autolog::auto_log_class"), MarkerKind::Declaration, [NodeKind::Struct])
            .register(custom, MarkerKind::Declaration, [NodeKind::Struct])
            .build();

        let resolution = Resolver::new(&tree, &model, &registry).resolve_candidate(widget);
        assert_eq!(resolution.finding.unwrap().marker.as_str(), "autolog::auto_log_class");
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(resolution.diagnostics[0].code, DiagnosticCode::ConflictingMarkers);
    }

    #[test]
    fn test_misplaced_marker_is_not_a_match() {
        let mut builder = SyntaxTree::builder();
        builder.open(NodeKind::Impl, Some("Widget"), vec![], None);
        let render = builder.leaf(NodeKind::Method, Some("render"), attr("auto_log_class"), None);
        let tree = builder.finish();

        let mut model = SymbolTable::new();
        model.bind_attribute(render, 0, SymbolPath::new("autolog::auto_log_class"));
        let registry = MarkerRegistry::autolog();

        let resolution = Resolver::new(&tree, &model, &registry).resolve_candidate(render);
        assert!(resolution.finding.is_none());
        assert_eq!(resolution.diagnostics[0].code, DiagnosticCode::MisplacedMarker);
    }

    #[test]
    fn test_method_in_trait_has_no_owner() {
        let mut builder = SyntaxTree::builder();
        builder.open(NodeKind::Module, Some("ui"), vec![], None);
        builder.open(NodeKind::Trait, Some("Draw"), vec![], None);
        let draw = builder.leaf(NodeKind::Method, Some("draw"), attr("auto_log_method"), None);
        let tree = builder.finish();

        let mut model = SymbolTable::new();
        model.bind_attribute(draw, 0, SymbolPath::new("autolog::auto_log_method"));
        let registry = MarkerRegistry::autolog();

        let resolution = Resolver::new(&tree, &model, &registry).resolve_candidate(draw);
        assert!(resolution.finding.is_none());
        assert_eq!(resolution.diagnostics[0].code, DiagnosticCode::OwnerNotFound);
    }

    #[test]
    fn test_impl_without_declared_symbol_is_unnamed() {
        let mut builder = SyntaxTree::builder();
        builder.open(NodeKind::Impl, Some("Vec"), vec![], None);
        let go = builder.leaf(NodeKind::Method, Some("go"), attr("auto_log_method"), None);
        let tree = builder.finish();

        let mut model = SymbolTable::new();
        model.bind_attribute(go, 0, SymbolPath::new("autolog::auto_log_method"));
        let registry = MarkerRegistry::autolog();

        let finding = Resolver::new(&tree, &model, &registry).resolve(go).unwrap();
        assert_eq!(finding.owner_name, None);
    }

    #[test]
    fn test_generic_owner_is_reported_not_matched() {
        let mut builder = SyntaxTree::builder();
        let imp = builder.open(NodeKind::Impl, Some("Widget"), vec![], None);
        let render = builder.leaf(NodeKind::Method, Some("render"), attr("auto_log_method"), None);
        let tree = builder.finish();

        let mut model = SymbolTable::new();
        model
            .bind_attribute(render, 0, SymbolPath::new("autolog::auto_log_method"))
            .declare(imp, DeclaredSymbol::new("Widget", ContainingNamespace::Global).with_generics());
        let registry = MarkerRegistry::autolog();

        let resolution = Resolver::new(&tree, &model, &registry).resolve_candidate(render);
        assert!(resolution.finding.is_none());
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(resolution.diagnostics[0].code, DiagnosticCode::GenericOwner);
        assert!(resolution.diagnostics[0].message.contains("`Widget` is generic"));
    }

    #[test]
    fn test_declared_name_preferred_over_spelling() {
        let mut builder = SyntaxTree::builder();
        let imp = builder.open(NodeKind::Impl, Some("W"), vec![], None);
        let render = builder.leaf(NodeKind::Method, Some("render"), attr("auto_log_method"), None);
        let tree = builder.finish();

        let mut model = SymbolTable::new();
        model
            .bind_attribute(render, 0, SymbolPath::new("autolog::auto_log_method"))
            .declare(imp, DeclaredSymbol::new("Widget", ContainingNamespace::Named("ui".into())));
        let registry = MarkerRegistry::autolog();

        let finding = Resolver::new(&tree, &model, &registry).resolve(render).unwrap();
        assert_eq!(finding.owner_name.as_deref(), Some("Widget"));
    }
}

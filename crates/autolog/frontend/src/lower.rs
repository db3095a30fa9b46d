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

//! Lowering of `syn` ASTs into the pipeline's syntax arena
//!
//! Every source file becomes a `SourceFile` root. Items that can carry a
//! marker, and the scopes that own them, become nodes; everything else is
//! only recorded in the module scopes used for name resolution. Function
//! bodies are not entered.

use crate::error::{FrontendError, FrontendResult};
use crate::scope::{ImportPath, ItemKind, ScopeIndex, ScopeModel};
use crate::source::SourceSet;
use autolog_core::syntax::{AttributeSyntax, NodeId, NodeKind, SourceLocation, SyntaxTree, SyntaxTreeBuilder};
use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Fields, GenericParam, Generics, Ident, ImplItem, Item, Meta, Path, Token, TraitItem, Type, UseTree};
use tracing::debug;

/// A crate snapshot ready for the pipeline
#[derive(Debug, Clone, Default)]
pub struct LoweredCrate {
    pub tree: SyntaxTree,
    pub scopes: ScopeIndex,
}

impl LoweredCrate {
    /// Semantic model over this snapshot
    pub fn model(&self) -> ScopeModel<'_> {
        ScopeModel::new(&self.tree, &self.scopes)
    }
}

/// Parse and lower every source of `sources`
pub fn lower(sources: &SourceSet) -> FrontendResult<LoweredCrate> {
    let mut lowering = Lowering::default();
    for (module, file) in sources.iter() {
        let parsed = syn::parse_file(&file.text).map_err(|e| FrontendError::syntax(&file.file_name, &e))?;
        lowering.file(module, &file.file_name, &parsed);
    }
    let lowered = lowering.finish();
    debug!(files = sources.len(), nodes = lowered.tree.len(), "lowered sources");
    Ok(lowered)
}

#[derive(Default)]
struct Lowering {
    builder: SyntaxTreeBuilder,
    scopes: ScopeIndex,
}

impl Lowering {
    fn finish(self) -> LoweredCrate {
        LoweredCrate {
            tree: self.builder.finish(),
            scopes: self.scopes,
        }
    }

    fn file(&mut self, module: &str, file_name: &str, parsed: &syn::File) {
        self.scopes.module_mut(module);
        let name = (!module.is_empty()).then_some(module);
        self.open(module, NodeKind::SourceFile, name, &[], None);
        let cx = Cx { module, file_name };
        for item in &parsed.items {
            self.item(&cx, item);
        }
        self.builder.close();
    }

    fn item(&mut self, cx: &Cx<'_>, item: &Item) {
        match item {
            Item::Struct(s) => {
                let name = unraw(&s.ident);
                self.declare_type(cx.module, &name, &s.generics);
                self.open(cx.module, NodeKind::Struct, Some(&name), &s.attrs, cx.at(s.ident.span()));
                self.fields(cx, &s.fields);
                self.builder.close();
            }
            Item::Union(u) => {
                let name = unraw(&u.ident);
                self.declare_type(cx.module, &name, &u.generics);
                self.open(cx.module, NodeKind::Union, Some(&name), &u.attrs, cx.at(u.ident.span()));
                for field in &u.fields.named {
                    let field_name = field.ident.as_ref().map(unraw);
                    self.leaf(cx.module, NodeKind::Field, field_name.as_deref(), &field.attrs, cx.at(field.span()));
                }
                self.builder.close();
            }
            Item::Enum(e) => {
                let name = unraw(&e.ident);
                self.declare_type(cx.module, &name, &e.generics);
                self.leaf(cx.module, NodeKind::Enum, Some(&name), &e.attrs, cx.at(e.ident.span()));
            }
            Item::Trait(t) => {
                let name = unraw(&t.ident);
                self.declare(cx.module, &name, ItemKind::Type);
                self.open(cx.module, NodeKind::Trait, Some(&name), &t.attrs, cx.at(t.ident.span()));
                for trait_item in &t.items {
                    match trait_item {
                        TraitItem::Fn(f) => {
                            self.leaf(cx.module, NodeKind::Method, Some(&unraw(&f.sig.ident)), &f.attrs, cx.at(f.sig.ident.span()));
                        }
                        TraitItem::Const(c) => {
                            self.leaf(cx.module, NodeKind::AssociatedConst, Some(&unraw(&c.ident)), &c.attrs, cx.at(c.ident.span()));
                        }
                        _ => {}
                    }
                }
                self.builder.close();
            }
            Item::Impl(i) => {
                let self_type = type_path(&i.self_ty);
                let name = self_type.as_ref().and_then(|p| p.segments.last().cloned());
                let node = self.open(cx.module, NodeKind::Impl, name.as_deref(), &i.attrs, cx.at(i.self_ty.span()));
                if let Some(self_type) = self_type {
                    self.scopes.record_impl_target(node, self_type);
                }
                for impl_item in &i.items {
                    match impl_item {
                        ImplItem::Fn(f) => {
                            self.leaf(cx.module, NodeKind::Method, Some(&unraw(&f.sig.ident)), &f.attrs, cx.at(f.sig.ident.span()));
                        }
                        ImplItem::Const(c) => {
                            self.leaf(cx.module, NodeKind::AssociatedConst, Some(&unraw(&c.ident)), &c.attrs, cx.at(c.ident.span()));
                        }
                        _ => {}
                    }
                }
                self.builder.close();
            }
            Item::Fn(f) => {
                let name = unraw(&f.sig.ident);
                self.declare(cx.module, &name, ItemKind::Value);
                self.leaf(cx.module, NodeKind::Function, Some(&name), &f.attrs, cx.at(f.sig.ident.span()));
            }
            Item::Const(c) => {
                let name = unraw(&c.ident);
                self.declare(cx.module, &name, ItemKind::Value);
                self.leaf(cx.module, NodeKind::Const, Some(&name), &c.attrs, cx.at(c.ident.span()));
            }
            Item::Static(s) => {
                let name = unraw(&s.ident);
                self.declare(cx.module, &name, ItemKind::Value);
                self.leaf(cx.module, NodeKind::Static, Some(&name), &s.attrs, cx.at(s.ident.span()));
            }
            Item::Type(t) => {
                let kind = type_path(&t.ty).map(ItemKind::TypeAlias).unwrap_or(ItemKind::Type);
                self.declare(cx.module, &unraw(&t.ident), kind);
            }
            Item::Mod(m) => {
                let name = unraw(&m.ident);
                self.declare(cx.module, &name, ItemKind::Module);
                if let Some((_, items)) = &m.content {
                    let child = join_module(cx.module, &name);
                    self.scopes.module_mut(&child);
                    self.open(cx.module, NodeKind::Module, Some(&name), &m.attrs, cx.at(m.ident.span()));
                    let inner = Cx { module: &child, file_name: cx.file_name };
                    for item in items {
                        self.item(&inner, item);
                    }
                    self.builder.close();
                }
            }
            Item::Use(u) => {
                let mut prefix = Vec::new();
                self.use_tree(cx.module, &u.tree, &mut prefix, u.leading_colon.is_some());
            }
            Item::ExternCrate(e) => {
                if let Some((_, rename)) = &e.rename {
                    let alias = unraw(rename);
                    if alias != "_" {
                        self.scopes.module_mut(cx.module).imports.insert(alias, ImportPath::new([unraw(&e.ident)], true));
                    }
                }
            }
            _ => {}
        }
    }

    fn fields(&mut self, cx: &Cx<'_>, fields: &Fields) {
        for (index, field) in fields.iter().enumerate() {
            let name = field.ident.as_ref().map(unraw).unwrap_or_else(|| index.to_string());
            self.leaf(cx.module, NodeKind::Field, Some(&name), &field.attrs, cx.at(field.span()));
        }
    }

    fn use_tree(&mut self, module: &str, tree: &UseTree, prefix: &mut Vec<String>, leading_colon: bool) {
        match tree {
            UseTree::Path(p) => {
                prefix.push(unraw(&p.ident));
                self.use_tree(module, &p.tree, prefix, leading_colon);
                prefix.pop();
            }
            UseTree::Name(n) => {
                let name = unraw(&n.ident);
                if name == "self" {
                    if let Some(alias) = prefix.last().cloned() {
                        self.import(module, alias, prefix.clone(), leading_colon);
                    }
                } else {
                    let mut target = prefix.clone();
                    target.push(name.clone());
                    self.import(module, name, target, leading_colon);
                }
            }
            UseTree::Rename(r) => {
                let alias = unraw(&r.rename);
                if alias == "_" {
                    return;
                }
                let mut target = prefix.clone();
                let name = unraw(&r.ident);
                if name != "self" {
                    target.push(name);
                }
                self.import(module, alias, target, leading_colon);
            }
            UseTree::Glob(_) => {
                self.scopes.module_mut(module).globs.push(ImportPath::new(prefix.iter().cloned(), leading_colon));
            }
            UseTree::Group(g) => {
                for item in &g.items {
                    self.use_tree(module, item, prefix, leading_colon);
                }
            }
        }
    }

    fn import(&mut self, module: &str, alias: String, target: Vec<String>, leading_colon: bool) {
        self.scopes.module_mut(module).imports.insert(alias, ImportPath::new(target, leading_colon));
    }

    fn declare(&mut self, module: &str, name: &str, kind: ItemKind) {
        self.scopes.module_mut(module).items.insert(name.to_string(), kind);
    }

    fn declare_type(&mut self, module: &str, name: &str, generics: &Generics) {
        self.declare(module, name, ItemKind::Type);
        // lifetimes can be elided in an impl header, type and const parameters cannot
        if generics.params.iter().any(|p| !matches!(p, GenericParam::Lifetime(_))) {
            self.scopes.record_generic(module, name);
        }
    }

    fn open(&mut self, module: &str, kind: NodeKind, name: Option<&str>, attrs: &[Attribute], location: Option<SourceLocation>) -> NodeId {
        let id = self.builder.open(kind, name, attributes(attrs), location);
        self.scopes.record_node(id, module);
        id
    }

    fn leaf(&mut self, module: &str, kind: NodeKind, name: Option<&str>, attrs: &[Attribute], location: Option<SourceLocation>) -> NodeId {
        let id = self.builder.leaf(kind, name, attributes(attrs), location);
        self.scopes.record_node(id, module);
        id
    }
}

/// Per-scope lowering context
struct Cx<'a> {
    module: &'a str,
    file_name: &'a str,
}

impl Cx<'_> {
    fn at(&self, span: Span) -> Option<SourceLocation> {
        let line = span.start().line;
        (line > 0).then(|| SourceLocation::new(self.file_name, line))
    }
}

fn attributes(attrs: &[Attribute]) -> Vec<AttributeSyntax> {
    let mut out = Vec::with_capacity(attrs.len());
    for attr in attrs {
        push_meta(&attr.meta, &mut out);
    }
    out
}

/// `cfg_attr(pred, a, b)` contributes `a` and `b`; the predicate is not evaluated
fn push_meta(meta: &Meta, out: &mut Vec<AttributeSyntax>) {
    if let Meta::List(list) = meta {
        if list.path.is_ident("cfg_attr") {
            if let Ok(nested) = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated) {
                for inner in nested.iter().skip(1) {
                    push_meta(inner, out);
                }
                return;
            }
        }
    }
    out.push(attribute_path(meta.path()));
}

fn attribute_path(path: &Path) -> AttributeSyntax {
    let mut syntax = AttributeSyntax::new(path.segments.iter().map(|s| unraw(&s.ident)));
    syntax.leading_colon = path.leading_colon.is_some();
    syntax
}

/// Path of a plain path type, generics dropped
fn type_path(ty: &Type) -> Option<ImportPath> {
    match ty {
        Type::Path(p) if p.qself.is_none() => Some(ImportPath::new(p.path.segments.iter().map(|s| unraw(&s.ident)), p.path.leading_colon.is_some())),
        Type::Paren(p) => type_path(&p.elem),
        Type::Group(g) => type_path(&g.elem),
        _ => None,
    }
}

fn unraw(ident: &Ident) -> String {
    ident.unraw().to_string()
}

fn join_module(module: &str, name: &str) -> String {
    if module.is_empty() { name.to_string() } else { format!("{}::{}", module, name) }
}

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

//! Module scopes and path resolution
//!
//! A deliberately small model of Rust name resolution, enough to tell which
//! item an attribute path or an `impl` self type denotes:
//!
//! - `crate`, `self` and `super` prefixes,
//! - `use` declarations (renames, groups, `self` in groups) followed
//!   transitively,
//! - items declared in the module, including submodules,
//! - glob imports, only when exactly one of them can supply the name,
//! - everything else with more than one segment is taken as an external
//!   crate path.
//!
//! Resolved paths are canonical: local items start with `crate`, external
//! ones with their crate name.

use autolog_core::semantic::{ContainingNamespace, DeclaredSymbol, SemanticModel, SymbolPath};
use autolog_core::syntax::{NodeId, NodeKind, SyntaxTree};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A path as written in a `use` declaration, attribute or type position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportPath {
    pub segments: Vec<String>,
    pub leading_colon: bool,
}

impl ImportPath {
    pub fn new<I, S>(segments: I, leading_colon: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            leading_colon,
        }
    }
}

/// What a name declared in a module stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Module,
    /// struct, enum, union or trait
    Type,
    /// `type Name = Target;`
    TypeAlias(ImportPath),
    /// functions, consts, statics
    Value,
}

/// Names visible in one module
#[derive(Debug, Clone, Default)]
pub struct ModuleScope {
    pub items: BTreeMap<String, ItemKind>,
    /// Alias → imported path
    pub imports: BTreeMap<String, ImportPath>,
    pub globs: Vec<ImportPath>,
}

/// Scopes of every module of a crate plus per-node bookkeeping
#[derive(Debug, Clone, Default)]
pub struct ScopeIndex {
    modules: BTreeMap<String, ModuleScope>,
    /// Module containing each node, by node index
    node_modules: Vec<String>,
    /// Self type of each `impl` node
    impl_targets: HashMap<NodeId, ImportPath>,
    /// Canonical paths of types declared with type or const parameters
    generic_types: BTreeSet<String>,
}

impl ScopeIndex {
    pub fn module_mut(&mut self, module: &str) -> &mut ModuleScope {
        self.modules.entry(module.to_string()).or_default()
    }

    pub fn module(&self, module: &str) -> Option<&ModuleScope> {
        self.modules.get(module)
    }

    pub fn record_node(&mut self, node: NodeId, module: &str) {
        let index = node.index();
        if self.node_modules.len() <= index {
            self.node_modules.resize(index + 1, String::new());
        }
        self.node_modules[index] = module.to_string();
    }

    pub fn record_impl_target(&mut self, node: NodeId, self_type: ImportPath) {
        self.impl_targets.insert(node, self_type);
    }

    pub fn record_generic(&mut self, module: &str, name: &str) {
        self.generic_types.insert(local_path(module, Some(name)).join("::"));
    }

    pub fn is_generic(&self, canonical: &[String]) -> bool {
        self.generic_types.contains(&canonical.join("::"))
    }

    /// Module containing `node`; the crate root for unknown nodes
    pub fn module_of(&self, node: NodeId) -> &str {
        self.node_modules.get(node.index()).map(String::as_str).unwrap_or("")
    }

    /// Canonical segments of `path` written inside `module`, or `None` if it names nothing known
    pub fn resolve(&self, module: &str, path: &ImportPath) -> Option<Vec<String>> {
        self.resolve_relative(module, path, false, true, &mut Vec::new())
    }

    /// `bare_is_external`: an unbound single segment names an external crate (true for `use` targets).
    /// `globs`: whether glob imports may bind the first segment.
    fn resolve_relative(&self, module: &str, path: &ImportPath, bare_is_external: bool, globs: bool, guard: &mut Vec<(String, String)>) -> Option<Vec<String>> {
        if path.leading_colon {
            return (!path.segments.is_empty()).then(|| path.segments.clone());
        }
        let (first, rest) = path.segments.split_first()?;
        match first.as_str() {
            "crate" => return self.resolve_qualified("", rest, guard),
            "self" => return self.resolve_qualified(module, rest, guard),
            "super" => return self.resolve_qualified(parent_module(module)?, rest, guard),
            _ => {}
        }

        let found = if globs { self.lookup(module, first, guard) } else { self.lookup_explicit(module, first, guard) };
        if let Some(base) = found {
            return self.descend(base, rest, guard);
        }
        if !rest.is_empty() || bare_is_external {
            return Some(path.segments.clone());
        }
        None
    }

    /// Resolve `segments` starting inside the local module `module`
    fn resolve_qualified(&self, module: &str, segments: &[String], guard: &mut Vec<(String, String)>) -> Option<Vec<String>> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(local_path(module, None));
        };
        match first.as_str() {
            "self" => self.resolve_qualified(module, rest, guard),
            "super" => self.resolve_qualified(parent_module(module)?, rest, guard),
            _ => {
                let base = self.lookup(module, first, guard)?;
                self.descend(base, rest, guard)
            }
        }
    }

    /// Continue `rest` from an already resolved `base`
    fn descend(&self, base: Vec<String>, rest: &[String], guard: &mut Vec<(String, String)>) -> Option<Vec<String>> {
        if rest.is_empty() {
            return Some(base);
        }
        if base.first().map(String::as_str) == Some("crate") {
            let module = base[1..].join("::");
            if self.is_module(&module) {
                return self.resolve_qualified(&module, rest, guard);
            }
        }
        // enum variants, associated items and external paths
        let mut path = base;
        path.extend(rest.iter().cloned());
        Some(path)
    }

    /// `name` as seen from `module`: explicit items and imports first, then globs
    fn lookup(&self, module: &str, name: &str, guard: &mut Vec<(String, String)>) -> Option<Vec<String>> {
        if let Some(found) = self.lookup_explicit(module, name, guard) {
            return Some(found);
        }

        let scope = self.modules.get(module)?;
        let key = (module.to_string(), format!("*{}", name));
        if scope.globs.is_empty() || guard.contains(&key) {
            return None;
        }
        guard.push(key);
        let mut candidates = Vec::new();
        for glob in &scope.globs {
            let Some(base) = self.resolve_relative(module, glob, true, false, guard) else { continue };
            if base.first().map(String::as_str) == Some("crate") {
                let source = base[1..].join("::");
                if let Some(found) = self.lookup_explicit(&source, name, guard) {
                    candidates.push(found);
                }
            } else {
                let mut path = base;
                path.push(name.to_string());
                candidates.push(path);
            }
        }
        guard.pop();
        candidates.dedup();
        if candidates.len() == 1 { candidates.pop() } else { None }
    }

    fn lookup_explicit(&self, module: &str, name: &str, guard: &mut Vec<(String, String)>) -> Option<Vec<String>> {
        let key = (module.to_string(), name.to_string());
        if guard.contains(&key) {
            return None;
        }
        guard.push(key);
        let found = self.lookup_unguarded(module, name, guard);
        guard.pop();
        found
    }

    fn lookup_unguarded(&self, module: &str, name: &str, guard: &mut Vec<(String, String)>) -> Option<Vec<String>> {
        let scope = self.modules.get(module);
        match scope.and_then(|s| s.items.get(name)) {
            Some(ItemKind::TypeAlias(target)) => return self.resolve_relative(module, target, false, true, guard).or_else(|| Some(local_path(module, Some(name)))),
            Some(_) => return Some(local_path(module, Some(name))),
            None => {}
        }
        if let Some(target) = scope.and_then(|s| s.imports.get(name)) {
            return self.resolve_relative(module, target, true, true, guard);
        }
        if self.modules.contains_key(&join_module(module, name)) {
            return Some(local_path(module, Some(name)));
        }
        None
    }

    fn is_module(&self, module: &str) -> bool {
        if self.modules.contains_key(module) {
            return true;
        }
        match module.rsplit_once("::") {
            Some((parent, name)) => self.item_kind(parent, name) == Some(&ItemKind::Module),
            None => self.item_kind("", module) == Some(&ItemKind::Module),
        }
    }

    fn item_kind(&self, module: &str, name: &str) -> Option<&ItemKind> {
        self.modules.get(module).and_then(|s| s.items.get(name))
    }
}

fn parent_module(module: &str) -> Option<&str> {
    if module.is_empty() {
        return None;
    }
    Some(module.rsplit_once("::").map(|(parent, _)| parent).unwrap_or(""))
}

fn join_module(module: &str, name: &str) -> String {
    if module.is_empty() { name.to_string() } else { format!("{}::{}", module, name) }
}

fn local_path(module: &str, name: Option<&str>) -> Vec<String> {
    let mut path = vec!["crate".to_string()];
    path.extend(module.split("::").filter(|s| !s.is_empty()).map(str::to_string));
    path.extend(name.map(str::to_string));
    path
}

fn namespace_of(module: &str) -> ContainingNamespace {
    if module.is_empty() { ContainingNamespace::Global } else { ContainingNamespace::Named(module.to_string()) }
}

/// [`SemanticModel`] over a lowered crate
#[derive(Debug, Clone, Copy)]
pub struct ScopeModel<'a> {
    tree: &'a SyntaxTree,
    scopes: &'a ScopeIndex,
}

impl<'a> ScopeModel<'a> {
    pub fn new(tree: &'a SyntaxTree, scopes: &'a ScopeIndex) -> Self {
        Self { tree, scopes }
    }
}

impl SemanticModel for ScopeModel<'_> {
    fn resolve_attribute(&self, node: NodeId, index: usize) -> Option<SymbolPath> {
        let attribute = self.tree.get(node)?.attributes.get(index)?;
        let path = ImportPath::new(attribute.segments.iter().cloned(), attribute.leading_colon);
        self.scopes.resolve(self.scopes.module_of(node), &path).map(SymbolPath::from_segments)
    }

    fn declared_symbol(&self, node: NodeId) -> Option<DeclaredSymbol> {
        let syntax = self.tree.get(node)?;
        let module = self.scopes.module_of(node);
        match syntax.kind {
            NodeKind::Struct | NodeKind::Enum | NodeKind::Union | NodeKind::Trait => {
                let name = syntax.name.clone()?;
                let generic = self.scopes.is_generic(&local_path(module, Some(&name)));
                let symbol = DeclaredSymbol::new(name, namespace_of(module));
                Some(if generic { symbol.with_generics() } else { symbol })
            }
            NodeKind::Impl => {
                // only crate-local types can be extended; foreign and unresolved self types have no symbol
                let target = self.scopes.impl_targets.get(&node)?;
                let path = self.scopes.resolve(module, target)?;
                if path.first().map(String::as_str) != Some("crate") || path.len() < 2 {
                    return None;
                }
                let symbol = DeclaredSymbol::new(path[path.len() - 1].clone(), namespace_of(&path[1..path.len() - 1].join("::")));
                Some(if self.scopes.is_generic(&path) { symbol.with_generics() } else { symbol })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(spelling: &str) -> ImportPath {
        let leading_colon = spelling.starts_with("::");
        ImportPath::new(spelling.trim_start_matches("::").split("::"), leading_colon)
    }

    fn resolved(index: &ScopeIndex, module: &str, spelling: &str) -> Option<String> {
        index.resolve(module, &path(spelling)).map(|p| p.join("::"))
    }

    fn sample_index() -> ScopeIndex {
        let mut index = ScopeIndex::default();
        let root = index.module_mut("");
        root.items.insert("ui".into(), ItemKind::Module);
        root.items.insert("Config".into(), ItemKind::Type);
        root.imports.insert("log_it".into(), path("autolog::auto_log_method"));
        root.imports.insert("al".into(), path("autolog"));

        let ui = index.module_mut("ui");
        ui.items.insert("Widget".into(), ItemKind::Type);
        ui.items.insert("W".into(), ItemKind::TypeAlias(path("Widget")));
        ui.imports.insert("marker".into(), path("crate::log_it"));
        ui.globs.push(path("super"));
        index
    }

    #[test]
    fn test_external_and_prefixed_paths() {
        let index = sample_index();
        assert_eq!(resolved(&index, "", "::autolog::auto_log_class").as_deref(), Some("autolog::auto_log_class"));
        assert_eq!(resolved(&index, "", "autolog::auto_log_class").as_deref(), Some("autolog::auto_log_class"));
        assert_eq!(resolved(&index, "ui", "crate::Config").as_deref(), Some("crate::Config"));
        assert_eq!(resolved(&index, "ui", "super::Config").as_deref(), Some("crate::Config"));
        assert_eq!(resolved(&index, "", "self::ui::Widget").as_deref(), Some("crate::ui::Widget"));
        assert_eq!(resolved(&index, "", "super::Config"), None);
    }

    #[test]
    fn test_import_aliases_are_followed() {
        let index = sample_index();
        assert_eq!(resolved(&index, "", "log_it").as_deref(), Some("autolog::auto_log_method"));
        assert_eq!(resolved(&index, "", "al::auto_log_class").as_deref(), Some("autolog::auto_log_class"));
        assert_eq!(resolved(&index, "ui", "marker").as_deref(), Some("autolog::auto_log_method"));
    }

    #[test]
    fn test_glob_and_bare_names() {
        let index = sample_index();
        // through `use super::*`
        assert_eq!(resolved(&index, "ui", "Config").as_deref(), Some("crate::Config"));
        assert_eq!(resolved(&index, "ui", "W").as_deref(), Some("crate::ui::Widget"));
        assert_eq!(resolved(&index, "", "derive"), None);
        assert_eq!(resolved(&index, "", "inline"), None);
    }

    #[test]
    fn test_import_cycle_is_guarded() {
        let mut index = ScopeIndex::default();
        let root = index.module_mut("");
        root.imports.insert("a".into(), path("self::b"));
        root.imports.insert("b".into(), path("self::a"));
        assert_eq!(resolved(&index, "", "a"), None);
        assert_eq!(resolved(&index, "", "a::x").as_deref(), Some("a::x"));
    }

    #[test]
    fn test_ambiguous_globs_do_not_resolve() {
        let mut index = ScopeIndex::default();
        let root = index.module_mut("");
        root.globs.push(path("autolog"));
        root.globs.push(path("other_markers"));
        assert_eq!(resolved(&index, "", "auto_log_class"), None);

        index.module_mut("").globs.pop();
        assert_eq!(resolved(&index, "", "auto_log_class").as_deref(), Some("autolog::auto_log_class"));
    }
}

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

//! Grouping completeness over generated snapshots

use autolog_core::{AttributeSyntax, ContainingNamespace, DeclaredSymbol, Generator, GeneratorConfig, MarkerRegistry, NodeKind, SymbolPath, SymbolTable, SyntaxTree};
use proptest::prelude::*;

/// One owner: whether the type is tagged, and which of its methods are
#[derive(Debug, Clone)]
struct OwnerShape {
    namespace: Option<String>,
    tagged: bool,
    methods: Vec<bool>,
}

fn owner_shape() -> impl Strategy<Value = OwnerShape> {
    (prop::option::of("[a-z]{1,6}"), any::<bool>(), prop::collection::vec(any::<bool>(), 0..6)).prop_map(|(namespace, tagged, methods)| OwnerShape { namespace, tagged, methods })
}

fn build(shapes: &[OwnerShape]) -> (SyntaxTree, SymbolTable) {
    let mut builder = SyntaxTree::builder();
    let mut model = SymbolTable::new();
    builder.open(NodeKind::SourceFile, None, vec![], None);
    for (i, shape) in shapes.iter().enumerate() {
        let name = format!("Owner{}", i);
        let namespace = match &shape.namespace {
            Some(ns) => ContainingNamespace::Named(ns.clone()),
            None => ContainingNamespace::Global,
        };
        let attrs = if shape.tagged { vec![AttributeSyntax::parse("auto_log_class")] } else { vec![AttributeSyntax::parse("derive")] };
        let ty = builder.leaf(NodeKind::Struct, Some(&name), attrs, None);
        model.declare(ty, DeclaredSymbol::new(&name, namespace.clone()));
        if shape.tagged {
            model.bind_attribute(ty, 0, SymbolPath::new("autolog::auto_log_class"));
        }

        let imp = builder.open(NodeKind::Impl, Some(&name), vec![], None);
        model.declare(imp, DeclaredSymbol::new(&name, namespace));
        for (m, &tagged) in shape.methods.iter().enumerate() {
            let attrs = if tagged { vec![AttributeSyntax::parse("auto_log_method")] } else { vec![] };
            let method = builder.leaf(NodeKind::Method, Some(&format!("m{}", m)), attrs, None);
            if tagged {
                model.bind_attribute(method, 0, SymbolPath::new("autolog::auto_log_method"));
            }
        }
        builder.close();
    }
    (builder.finish(), model)
}

proptest! {
    #[test]
    fn prop_one_artifact_per_owner_one_snippet_per_finding(shapes in prop::collection::vec(owner_shape(), 0..12)) {
        let (tree, model) = build(&shapes);
        let generator = Generator::new(GeneratorConfig::parallel(), MarkerRegistry::autolog()).unwrap();
        let output = generator.run(&tree, &model);

        let mut expected_owners = 0;
        for (i, shape) in shapes.iter().enumerate() {
            let tagged_methods: Vec<usize> = shape.methods.iter().enumerate().filter(|(_, t)| **t).map(|(m, _)| m).collect();
            let findings = usize::from(shape.tagged) + tagged_methods.len();
            let owner = format!("Owner{}", i);
            let artifact = output.artifacts.iter().find(|a| a.owner_name == owner);
            if findings == 0 {
                prop_assert!(artifact.is_none());
                continue;
            }
            expected_owners += 1;
            let artifact = artifact.unwrap();
            prop_assert_eq!(artifact.source_text.matches("pub fn ").count(), findings);

            // collector order: the type precedes its impl, methods in declaration order
            let mut last = 0;
            let idents = shape.tagged.then(|| "log_class".to_string()).into_iter().chain(tagged_methods.iter().map(|m| format!("log_method_m{}", m)));
            for ident in idents {
                let at = artifact.source_text.find(&format!("fn {}(", ident)).unwrap();
                prop_assert!(at >= last);
                last = at;
            }
        }
        prop_assert_eq!(output.artifacts.len(), expected_owners);
        prop_assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn prop_artifact_order_is_sorted_by_owner_key(shapes in prop::collection::vec(owner_shape(), 0..12)) {
        let (tree, model) = build(&shapes);
        let generator = Generator::new(GeneratorConfig::sequential(), MarkerRegistry::autolog()).unwrap();
        let output = generator.run(&tree, &model);
        let keys: Vec<(String, String)> = output.artifacts.iter().map(|a| (a.namespace.clone(), a.owner_name.clone())).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }
}

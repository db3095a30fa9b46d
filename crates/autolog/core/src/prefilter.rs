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

//! Syntax-only candidate filter

use crate::syntax::SyntaxNode;

/// Whether `node` may carry a marker.
///
/// Over-inclusive: any attribute on any declaration passes, spelling is not
/// inspected. The resolver does the precise check.
pub fn is_candidate(node: &SyntaxNode) -> bool {
    node.kind.is_declaration_like() && node.has_attributes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{AttributeSyntax, NodeKind, SyntaxTree};

    #[test]
    fn test_candidate_requires_attribute_and_declaration() {
        let mut builder = SyntaxTree::builder();
        let file = builder.open(NodeKind::SourceFile, None, vec![AttributeSyntax::parse("allow")], None);
        let tagged = builder.leaf(NodeKind::Struct, Some("Widget"), vec![AttributeSyntax::parse("derive")], None);
        let plain = builder.leaf(NodeKind::Struct, Some("Plain"), vec![], None);
        let other = builder.leaf(NodeKind::Other, None, vec![AttributeSyntax::parse("auto_log_class")], None);
        let tree = builder.finish();

        assert!(!is_candidate(tree.node(file)));
        assert!(is_candidate(tree.node(tagged)));
        assert!(!is_candidate(tree.node(plain)));
        assert!(!is_candidate(tree.node(other)));
    }
}

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

//! Text rendering of generated code
//!
//! The emitter only decides *what* is generated for each owner; the
//! [`Renderer`] owns the template text.

use crate::registry::{MarkerKind, MarkerRegistry, MemberRole};
use crate::resolver::Augmentation;

/// Header line every generated file starts with
pub const AUTO_GENERATED_HEADER: &str = "// <auto-generated/>";

/// One rendered item for an owner's extension body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Identifier the snippet defines inside the extension; must be unique per owner
    pub ident: String,
    pub text: String,
}

/// Template seam between grouping and text
pub trait Renderer: Send + Sync {
    /// Render the snippet for one finding of `owner_name`
    fn snippet(&self, owner_name: &str, augmentation: &Augmentation) -> Snippet;

    /// Wrap the snippets of one owner in an open extension of that owner
    fn extension(&self, namespace: &str, owner_name: &str, snippets: &[Snippet]) -> String;

    /// Definitions of the registered markers, independent of any input
    fn marker_declarations(&self, registry: &MarkerRegistry) -> String;
}

/// Renders inherent `impl` blocks with logging helpers
#[derive(Debug, Clone, Copy, Default)]
pub struct RustRenderer;

impl RustRenderer {
    fn method(ident: &str, message: &str) -> String {
        format!("    pub fn {ident}(&self) {{\n        println!(\"{message}\");\n    }}\n", ident = ident, message = message.replace('"', "\\\""))
    }
}

impl Renderer for RustRenderer {
    fn snippet(&self, owner_name: &str, augmentation: &Augmentation) -> Snippet {
        let (ident, message) = match augmentation {
            Augmentation::Declaration => ("log_class".to_string(), format!("[CLASS] {} initialized.", owner_name)),
            Augmentation::Member { name, role: MemberRole::Property } => (format!("log_prop_{}", name), format!("[PROP] {} changed.", name)),
            Augmentation::Member { name, role: MemberRole::Method } => (format!("log_method_{}", name), format!("[METHOD] {} executed.", name)),
        };
        let text = Self::method(&ident, &message);
        Snippet { ident, text }
    }

    fn extension(&self, namespace: &str, owner_name: &str, snippets: &[Snippet]) -> String {
        let target = if namespace.is_empty() { owner_name.to_string() } else { format!("crate::{}::{}", namespace, owner_name) };
        let body: Vec<&str> = snippets.iter().map(|s| s.text.as_str()).collect();

        let mut out = String::new();
        out.push_str(AUTO_GENERATED_HEADER);
        out.push('\n');
        out.push_str("// Generated by autolog. Do not edit.\n\n");
        out.push_str("#[allow(non_snake_case, dead_code)]\n");
        out.push_str(&format!("impl {} {{\n", target));
        out.push_str(&body.join("\n"));
        out.push_str("}\n");
        out
    }

    fn marker_declarations(&self, registry: &MarkerRegistry) -> String {
        let mut out = String::new();
        out.push_str(AUTO_GENERATED_HEADER);
        out.push('\n');
        out.push_str("// Marker attributes recognized by autolog. They expand to the item unchanged.\n\n");
        out.push_str("use proc_macro::TokenStream;\n");
        for entry in registry.entries() {
            let level = match entry.kind {
                MarkerKind::Declaration => "Declaration-level",
                MarkerKind::Member(MemberRole::Property) => "Property-level",
                MarkerKind::Member(MemberRole::Method) => "Method-level",
            };
            out.push_str(&format!(
                "\n/// {} marker `{}`.\n#[proc_macro_attribute]\npub fn {}(_args: TokenStream, item: TokenStream) -> TokenStream {{\n    item\n}}\n",
                level,
                entry.identity,
                entry.identity.name()
            ));
        }
        out
    }
}

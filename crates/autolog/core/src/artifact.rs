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

//! Emitted artifacts

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Input-independent definitions of the recognized markers
    MarkerDeclarations,
    /// Open extension of one owner
    Extension,
}

/// One synthesized source fragment, ready for the host to persist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique, deterministic name
    pub id: String,
    pub kind: ArtifactKind,
    /// Owner module path, `""` at the crate root and for marker declarations
    pub namespace: String,
    /// Owner type name, `""` for marker declarations
    pub owner_name: String,
    pub source_text: String,
}

impl Artifact {
    pub fn extension(namespace: &str, owner_name: &str, suffix: &str, source_text: String) -> Self {
        Self {
            id: artifact_id(namespace, owner_name, suffix),
            kind: ArtifactKind::Extension,
            namespace: namespace.to_string(),
            owner_name: owner_name.to_string(),
            source_text,
        }
    }

    pub fn marker_declarations(id: impl Into<String>, source_text: String) -> Self {
        Self {
            id: id.into(),
            kind: ArtifactKind::MarkerDeclarations,
            namespace: String::new(),
            owner_name: String::new(),
            source_text,
        }
    }

    /// Hex blake3 digest of id and text; equal fingerprints mean identical output
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.id.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.source_text.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

/// `ui::widgets` + `Widget` → `ui.widgets.Widget<suffix>`; `Widget<suffix>` at the root.
///
/// Module names cannot contain `.`, so distinct owners never share an id.
pub fn artifact_id(namespace: &str, owner_name: &str, suffix: &str) -> String {
    if namespace.is_empty() {
        format!("{}{}", owner_name, suffix)
    } else {
        format!("{}.{}{}", namespace.replace("::", "."), owner_name, suffix)
    }
}

/// `namespace::Owner`, or just `Owner` at the root
pub fn qualified_owner(namespace: &str, owner_name: &str) -> String {
    if namespace.is_empty() { owner_name.to_string() } else { format!("{}::{}", namespace, owner_name) }
}

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

//! Marker registry
//!
//! Maps canonical marker identities to the augmentation they request. Built
//! once, immutable afterwards, and handed to the resolver explicitly.

use crate::semantic::SymbolPath;
use crate::syntax::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Crate that publishes the default markers
pub const MARKER_CRATE: &str = "autolog";

/// Which member flavour a member-level marker augments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    /// Data member (struct field)
    Property,
    /// Routine member (associated fn)
    Method,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Method => "method",
        }
    }
}

/// Augmentation requested by a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Applies to the owning declaration itself
    Declaration,
    /// Applies to one member of the owner
    Member(MemberRole),
}

/// One registered marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerEntry {
    pub identity: SymbolPath,
    pub kind: MarkerKind,
    /// Node kinds the marker may be attached to
    pub targets: Vec<NodeKind>,
}

impl MarkerEntry {
    pub fn applies_to(&self, kind: NodeKind) -> bool {
        self.targets.contains(&kind)
    }
}

/// Immutable identity → kind table
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    entries: BTreeMap<SymbolPath, MarkerEntry>,
}

impl MarkerRegistry {
    pub fn builder() -> MarkerRegistryBuilder {
        MarkerRegistryBuilder::default()
    }

    /// The three markers published by the `autolog` crate
    pub fn autolog() -> Self {
        Self::builder()
            .register(
                SymbolPath::from_segments([MARKER_CRATE, "auto_log_class"]),
                MarkerKind::Declaration,
                [NodeKind::Struct, NodeKind::Enum, NodeKind::Union],
            )
            .register(SymbolPath::from_segments([MARKER_CRATE, "auto_log_property"]), MarkerKind::Member(MemberRole::Property), [NodeKind::Field])
            .register(SymbolPath::from_segments([MARKER_CRATE, "auto_log_method"]), MarkerKind::Member(MemberRole::Method), [NodeKind::Method])
            .build()
    }

    pub fn lookup(&self, identity: &SymbolPath) -> Option<&MarkerEntry> {
        self.entries.get(identity)
    }

    /// Entries in identity order
    pub fn entries(&self) -> impl Iterator<Item = &MarkerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`MarkerRegistry`]
#[derive(Debug, Default)]
pub struct MarkerRegistryBuilder {
    entries: BTreeMap<SymbolPath, MarkerEntry>,
}

impl MarkerRegistryBuilder {
    /// Register a marker; re-registering an identity replaces the earlier entry
    pub fn register(mut self, identity: SymbolPath, kind: MarkerKind, targets: impl IntoIterator<Item = NodeKind>) -> Self {
        let entry = MarkerEntry {
            identity: identity.clone(),
            kind,
            targets: targets.into_iter().collect(),
        };
        self.entries.insert(identity, entry);
        self
    }

    pub fn build(self) -> MarkerRegistry {
        MarkerRegistry { entries: self.entries }
    }
}

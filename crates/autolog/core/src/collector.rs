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

//! Collector barrier
//!
//! Materializes every finding of the snapshot before grouping starts and drops
//! the tree references, so nothing downstream can observe the snapshot.

use crate::resolver::{Augmentation, Finding};
use crate::semantic::SymbolPath;
use crate::syntax::SourceLocation;
use serde::{Deserialize, Serialize};

/// Plain, snapshot-independent form of a finding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub owner_name: Option<String>,
    pub owner_namespace: String,
    pub augmentation: Augmentation,
    pub marker: SymbolPath,
    pub location: Option<SourceLocation>,
}

impl From<Finding<'_>> for Target {
    fn from(finding: Finding<'_>) -> Self {
        Self {
            owner_name: finding.owner_name,
            owner_namespace: finding.owner_namespace,
            augmentation: finding.augmentation,
            marker: finding.marker,
            location: finding.location,
        }
    }
}

/// Drop absent entries and keep production order
pub fn collect<'t, I>(findings: I) -> Vec<Target>
where
    I: IntoIterator<Item = Option<Finding<'t>>>,
{
    findings.into_iter().flatten().map(Target::from).collect()
}

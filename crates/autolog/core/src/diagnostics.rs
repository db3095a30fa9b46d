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

//! User-visible, non-fatal reports raised while resolving and grouping

use crate::syntax::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Stable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// More than one recognized marker on a single declaration
    ConflictingMarkers,
    /// Recognized marker attached to a declaration kind it does not support
    MisplacedMarker,
    /// Member marker with no enclosing type or impl
    OwnerNotFound,
    /// Owner found but its name could not be determined
    UnnamedOwner,
    /// Two snippets in one artifact would define the same item
    DuplicateGeneratedMember,
    /// Owner has type or const parameters the extension cannot spell
    GenericOwner,
}

impl DiagnosticCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConflictingMarkers => "AL0001",
            Self::MisplacedMarker => "AL0002",
            Self::OwnerNotFound => "AL0003",
            Self::UnnamedOwner => "AL0004",
            Self::DuplicateGeneratedMember => "AL0005",
            Self::GenericOwner => "AL0006",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Self::DuplicateGeneratedMember => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    /// `namespace::Owner` the diagnostic concerns, when known
    pub owner: Option<String>,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            owner: None,
            location: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity.as_str(), self.code.code(), self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        Ok(())
    }
}

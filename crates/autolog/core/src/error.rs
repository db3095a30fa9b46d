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

//! Error types for the generation pipeline
//!
//! Resolution and grouping never fail; their problems are reported as
//! diagnostics. These errors cover configuration and cancellation.

use thiserror::Error;

/// Errors that can stop a generation run
#[derive(Error, Debug)]
pub enum GenerationError {
    // Configuration Errors
    #[error("Configuration validation failed: {field} - {details}")]
    ConfigurationValidationError { field: String, details: String },

    #[error("Failed to parse configuration: {0}")]
    ConfigurationParse(#[from] serde_json::Error),

    // Run control
    #[error("Generation run cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Create a configuration validation error
    pub fn validation(field: impl Into<String>, details: impl Into<String>) -> Self {
        Self::ConfigurationValidationError {
            field: field.into(),
            details: details.into(),
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationValidationError { .. } | Self::ConfigurationParse(_) => ErrorCategory::Configuration,
            Self::Cancelled => ErrorCategory::Cancellation,
        }
    }
}

/// Error categories for better error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Cancellation,
}

impl ErrorCategory {
    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Cancellation => "cancellation",
        }
    }
}

/// Result type alias for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;

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

//! Host-side errors
//!
//! Everything here belongs to the host's failure domain: unreadable or
//! unparsable sources and unwritable output. The pipeline itself only fails
//! on configuration or cancellation.

use autolog_core::GenerationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("Failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest serialization failed: {0}")]
    Manifest(#[source] serde_json::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Environment variable {0} is not set")]
    MissingEnv(String),
}

impl FrontendError {
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Parse error with the line `syn` reports
    pub fn syntax(file: impl Into<String>, error: &syn::Error) -> Self {
        Self::parse(file, format!("{} (line {})", error, error.span().start().line))
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type FrontendResult<T> = Result<T, FrontendError>;

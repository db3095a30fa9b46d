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

//! Configuration for the generation pipeline

use crate::error::{GenerationError, GenerationResult};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Generator`](crate::pipeline::Generator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Whether to resolve candidates on the rayon thread pool
    pub parallel: bool,

    /// Minimum number of tree nodes before resolution goes parallel
    pub parallel_threshold: usize,

    /// Appended to every extension artifact id
    pub artifact_suffix: String,

    /// Id of the marker declarations artifact
    pub marker_declarations_id: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 256,
            artifact_suffix: ".autolog.g.rs".to_string(),
            marker_declarations_id: "autolog_markers.g.rs".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Single-threaded configuration
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    /// Always resolve in parallel, whatever the tree size
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 1,
            ..Default::default()
        }
    }

    /// Load from a JSON document; absent fields take their defaults
    pub fn from_json(json: &str) -> GenerationResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> GenerationResult<()> {
        if self.parallel_threshold == 0 {
            return Err(GenerationError::validation("parallel_threshold", "must be greater than 0"));
        }

        validate_file_name("artifact_suffix", &self.artifact_suffix)?;
        if !self.artifact_suffix.ends_with(".rs") {
            return Err(GenerationError::validation("artifact_suffix", "must end with `.rs`"));
        }

        validate_file_name("marker_declarations_id", &self.marker_declarations_id)?;

        Ok(())
    }
}

fn validate_file_name(field: &str, value: &str) -> GenerationResult<()> {
    if value.is_empty() {
        return Err(GenerationError::validation(field, "must not be empty"));
    }
    if value.contains(['/', '\\']) {
        return Err(GenerationError::validation(field, "must not contain a path separator"));
    }
    Ok(())
}

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

//! Host configuration

use crate::error::FrontendResult;
use autolog_core::config::GeneratorConfig;
use autolog_core::error::GenerationError;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Host`](crate::host::Host)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Pipeline settings
    pub generator: GeneratorConfig,

    /// Directory under `OUT_DIR` that receives the artifacts
    pub output_subdir: String,

    /// Write `autolog-manifest.json` next to the artifacts
    pub write_manifest: bool,

    /// Print diagnostics as `cargo:warning=` lines from build scripts
    pub cargo_warnings: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            output_subdir: "autolog".to_string(),
            write_manifest: true,
            cargo_warnings: true,
        }
    }
}

impl HostConfig {
    pub fn from_json(json: &str) -> FrontendResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(GenerationError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FrontendResult<()> {
        self.generator.validate()?;
        if self.output_subdir.is_empty() {
            return Err(GenerationError::validation("output_subdir", "must not be empty").into());
        }
        if self.output_subdir.starts_with(['/', '\\']) || self.output_subdir.split(['/', '\\']).any(|part| part == "..") {
            return Err(GenerationError::validation("output_subdir", "must be a relative path inside OUT_DIR").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = HostConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output_subdir, "autolog");
        assert!(config.write_manifest);
    }

    #[test]
    fn test_from_json_nested_generator() {
        let config = HostConfig::from_json(r#"{ "cargo_warnings": false, "generator": { "parallel": false } }"#).unwrap();
        assert!(!config.cargo_warnings);
        assert!(!config.generator.parallel);
        assert_eq!(config.generator.parallel_threshold, 256);
    }

    #[test]
    fn test_validation_rejects_escaping_subdir() {
        assert!(HostConfig::from_json(r#"{ "output_subdir": "../elsewhere" }"#).is_err());
        assert!(HostConfig::from_json(r#"{ "output_subdir": "/tmp/x" }"#).is_err());
        assert!(HostConfig::from_json(r#"{ "output_subdir": "" }"#).is_err());
        assert!(HostConfig::from_json(r#"{ "generator": { "parallel_threshold": 0 } }"#).is_err());
        assert!(HostConfig::from_json(r#"{ "output_subdir": "gen/autolog" }"#).is_ok());
    }
}

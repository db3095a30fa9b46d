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

//! Reference host: sources in, artifacts out

use crate::config::HostConfig;
use crate::error::{FrontendError, FrontendResult};
use crate::lower::lower;
use crate::sink::{ArtifactSink, DirectorySink, WriteOutcome};
use crate::source::SourceSet;
use autolog_core::diagnostics::Diagnostic;
use autolog_core::pipeline::{Generator, PipelineStats};
use autolog_core::registry::MarkerRegistry;
use std::path::PathBuf;
use tracing::info;

/// Summary of one host run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Ids of every persisted artifact, marker declarations first
    pub artifact_ids: Vec<String>,
    /// Ids whose files were (re)written
    pub written: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: PipelineStats,
}

impl GenerationReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Number of artifacts whose content did not change
    pub fn unchanged(&self) -> usize {
        self.artifact_ids.len() - self.written.len()
    }
}

/// Runs lowering, the pipeline and persistence
pub struct Host {
    config: HostConfig,
    generator: Generator,
}

impl Host {
    pub fn new(config: HostConfig) -> FrontendResult<Self> {
        Self::with_registry(config, MarkerRegistry::autolog())
    }

    pub fn with_registry(config: HostConfig, registry: MarkerRegistry) -> FrontendResult<Self> {
        config.validate()?;
        let generator = Generator::new(config.generator.clone(), registry)?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Generate for `sources` and persist into `sink`
    pub fn generate(&self, sources: &SourceSet, sink: &mut dyn ArtifactSink) -> FrontendResult<GenerationReport> {
        let lowered = lower(sources)?;
        let output = self.generator.run(&lowered.tree, &lowered.model());

        let mut report = GenerationReport {
            diagnostics: output.diagnostics,
            stats: output.stats,
            ..Default::default()
        };

        let markers = self.generator.marker_declarations();
        for artifact in std::iter::once(&markers).chain(output.artifacts.iter()) {
            if sink.persist(artifact)? == WriteOutcome::Written {
                report.written.push(artifact.id.clone());
            }
            report.artifact_ids.push(artifact.id.clone());
        }
        sink.finish()?;

        info!(artifacts = report.artifact_ids.len(), written = report.written.len(), diagnostics = report.diagnostics.len(), "host run finished");
        Ok(report)
    }

    /// Entry point for `build.rs`: reads `$CARGO_MANIFEST_DIR/src`, writes into `$OUT_DIR/<output_subdir>`
    pub fn build_script(&self) -> FrontendResult<GenerationReport> {
        let manifest_dir = env_path("CARGO_MANIFEST_DIR")?;
        let out_dir = env_path("OUT_DIR")?;
        let src = manifest_dir.join("src");

        let sources = SourceSet::from_dir(&src)?;
        println!("cargo:rerun-if-changed={}", src.display());
        for file in sources.file_names() {
            println!("cargo:rerun-if-changed={}", file);
        }

        let mut sink = DirectorySink::new(out_dir.join(&self.config.output_subdir))?.with_manifest(self.config.write_manifest);
        let report = self.generate(&sources, &mut sink)?;

        if self.config.cargo_warnings {
            for diagnostic in &report.diagnostics {
                println!("cargo:warning={}", diagnostic);
            }
        }
        Ok(report)
    }
}

/// Run the default host from a build script
pub fn build_script() -> FrontendResult<GenerationReport> {
    Host::new(HostConfig::default())?.build_script()
}

fn env_path(name: &str) -> FrontendResult<PathBuf> {
    std::env::var_os(name).map(PathBuf::from).ok_or_else(|| FrontendError::MissingEnv(name.to_string()))
}

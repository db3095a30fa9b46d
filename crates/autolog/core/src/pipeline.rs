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

//! Pipeline driver
//!
//! A run is a pure function of the snapshot:
//!
//! 1. prefilter + resolve every node (optionally on the rayon pool; the
//!    ordered `collect` keeps traversal order),
//! 2. collect (the barrier: every finding is materialized before step 3),
//! 3. group and emit.
//!
//! The [`Generator`] keeps no state between runs.

use crate::artifact::Artifact;
use crate::collector::{self, Target};
use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostic;
use crate::emitter::Emitter;
use crate::error::{GenerationError, GenerationResult};
use crate::prefilter::is_candidate;
use crate::registry::MarkerRegistry;
use crate::render::{Renderer, RustRenderer};
use crate::resolver::{Resolution, Resolver};
use crate::semantic::SemanticModel;
use crate::syntax::{NodeId, SyntaxTree};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

/// Shared flag a host trips to abandon an in-flight run
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters and timings of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub nodes_visited: usize,
    pub candidates: usize,
    pub findings: usize,
    pub artifacts: usize,
    pub diagnostics: usize,
    pub parallel: bool,
    /// Execution time for each stage
    pub stage_times: BTreeMap<String, Duration>,
}

impl PipelineStats {
    /// Record stage execution time
    pub fn record_stage_time(&mut self, stage: &str, duration: Duration) {
        self.stage_times.insert(stage.to_string(), duration);
    }

    /// Get total execution time
    pub fn total_time(&self) -> Duration {
        self.stage_times.values().sum()
    }

    /// Human readable summary
    pub fn report(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Autolog Generation Report ===\n\n");
        report.push_str(&format!("Nodes visited: {}\n", self.nodes_visited));
        report.push_str(&format!("Candidates: {}\n", self.candidates));
        report.push_str(&format!("Findings: {}\n", self.findings));
        report.push_str(&format!("Artifacts: {}\n", self.artifacts));
        report.push_str(&format!("Diagnostics: {}\n", self.diagnostics));
        report.push_str(&format!("Mode: {}\n", if self.parallel { "parallel" } else { "sequential" }));

        report.push_str("\nStage Execution Times:\n");
        for (stage, duration) in &self.stage_times {
            report.push_str(&format!("  {}: {:.3}ms\n", stage, duration.as_secs_f64() * 1000.0));
        }
        report.push_str(&format!("  total: {:.3}ms\n", self.total_time().as_secs_f64() * 1000.0));
        report
    }
}

/// Everything one run produces
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    /// One extension per owner, sorted by `(namespace, owner)`
    pub artifacts: Vec<Artifact>,
    /// Resolution diagnostics in traversal order, then emission diagnostics
    pub diagnostics: Vec<Diagnostic>,
    pub stats: PipelineStats,
}

impl GenerationOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn artifact(&self, id: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }
}

/// Marker discovery and extension synthesis
pub struct Generator {
    config: GeneratorConfig,
    registry: MarkerRegistry,
    renderer: Box<dyn Renderer>,
}

impl Generator {
    /// Create a generator with the default renderer
    pub fn new(config: GeneratorConfig, registry: MarkerRegistry) -> GenerationResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            renderer: Box::new(RustRenderer),
        })
    }

    /// Replace the template renderer
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    /// Definitions of the recognized markers; does not depend on any snapshot
    pub fn marker_declarations(&self) -> Artifact {
        Artifact::marker_declarations(self.config.marker_declarations_id.clone(), self.renderer.marker_declarations(&self.registry))
    }

    /// Run the pipeline to completion
    pub fn run<M>(&self, tree: &SyntaxTree, model: &M) -> GenerationOutput
    where
        M: SemanticModel + Sync + ?Sized,
    {
        self.execute(tree, model, &|| false).unwrap_or_default()
    }

    /// Run the pipeline, giving up with [`GenerationError::Cancelled`] once `token` is tripped
    pub fn run_cancellable<M>(&self, tree: &SyntaxTree, model: &M, token: &CancellationToken) -> GenerationResult<GenerationOutput>
    where
        M: SemanticModel + Sync + ?Sized,
    {
        self.execute(tree, model, &|| token.is_cancelled()).ok_or(GenerationError::Cancelled)
    }

    /// `None` when `cancelled` reported true at a stage boundary
    fn execute<M>(&self, tree: &SyntaxTree, model: &M, cancelled: &(dyn Fn() -> bool + Sync)) -> Option<GenerationOutput>
    where
        M: SemanticModel + Sync + ?Sized,
    {
        let span = info_span!("autolog_run", nodes = tree.len());
        let _guard = span.enter();

        let parallel = self.config.parallel && tree.len() >= self.config.parallel_threshold;
        let mut stats = PipelineStats {
            nodes_visited: tree.len(),
            parallel,
            ..Default::default()
        };

        // Stage 1: prefilter + resolve
        let stage_start = Instant::now();
        let resolutions = self.resolve_all(tree, model, parallel, cancelled);
        stats.candidates = resolutions.len();
        stats.record_stage_time("resolution", stage_start.elapsed());
        debug!(candidates = stats.candidates, parallel, "resolution finished");
        if cancelled() {
            info!("run cancelled after resolution");
            return None;
        }

        // Stage 2: collector barrier
        let stage_start = Instant::now();
        let mut diagnostics = Vec::new();
        let targets: Vec<Target> = collector::collect(resolutions.into_iter().map(|resolution| {
            diagnostics.extend(resolution.diagnostics);
            resolution.finding
        }));
        stats.findings = targets.len();
        stats.record_stage_time("collection", stage_start.elapsed());
        debug!(findings = stats.findings, "collection finished");

        // Stage 3: group + emit
        let stage_start = Instant::now();
        let emission = Emitter::new(self.renderer.as_ref(), &self.config.artifact_suffix).emit(&targets);
        diagnostics.extend(emission.diagnostics);
        stats.artifacts = emission.artifacts.len();
        stats.diagnostics = diagnostics.len();
        stats.record_stage_time("emission", stage_start.elapsed());
        if cancelled() {
            info!("run cancelled after emission");
            return None;
        }

        for diagnostic in &diagnostics {
            warn!(code = diagnostic.code.code(), "{}", diagnostic);
        }
        info!(artifacts = stats.artifacts, findings = stats.findings, diagnostics = stats.diagnostics, elapsed_ms = stats.total_time().as_millis() as u64, "generation finished");

        Some(GenerationOutput {
            artifacts: emission.artifacts,
            diagnostics,
            stats,
        })
    }

    fn resolve_all<'t, M>(&'t self, tree: &'t SyntaxTree, model: &'t M, parallel: bool, cancelled: &(dyn Fn() -> bool + Sync)) -> Vec<Resolution<'t>>
    where
        M: SemanticModel + Sync + ?Sized,
    {
        let resolver = Resolver::new(tree, model, &self.registry);
        let resolve = |id: NodeId| -> Option<Resolution<'t>> {
            if cancelled() || !is_candidate(tree.node(id)) {
                return None;
            }
            Some(resolver.resolve_candidate(id))
        };

        if parallel {
            let ids: Vec<NodeId> = tree.node_ids().collect();
            ids.par_iter().filter_map(|&id| resolve(id)).collect()
        } else {
            tree.node_ids().filter_map(resolve).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;
    use crate::diagnostics::DiagnosticCode;
    use crate::semantic::{ContainingNamespace, DeclaredSymbol, SymbolPath, SymbolTable};
    use crate::syntax::{AttributeSyntax, NodeKind};
    use proptest::prelude::*;

    const CLASS: &str = "autolog::auto_log_class";
    const METHOD: &str = "autolog::auto_log_method";

    /// `count` structs, each with an impl holding one tagged method, every other struct tagged too
    fn widget_snapshot(count: usize) -> (SyntaxTree, SymbolTable) {
        let mut builder = SyntaxTree::builder();
        let mut model = SymbolTable::new();
        builder.open(NodeKind::SourceFile, None, vec![], None);
        for i in 0..count {
            let name = format!("Widget{}", i);
            let attrs = if i % 2 == 0 { vec![AttributeSyntax::parse("auto_log_class")] } else { vec![] };
            let st = builder.leaf(NodeKind::Struct, Some(&name), attrs, None);
            model.declare(st, DeclaredSymbol::new(&name, ContainingNamespace::Global));
            if i % 2 == 0 {
                model.bind_attribute(st, 0, SymbolPath::new(CLASS));
            }

            let imp = builder.open(NodeKind::Impl, Some(&name), vec![], None);
            model.declare(imp, DeclaredSymbol::new(&name, ContainingNamespace::Global));
            let m = builder.leaf(NodeKind::Method, Some("render"), vec![AttributeSyntax::parse("auto_log_method")], None);
            model.bind_attribute(m, 0, SymbolPath::new(METHOD));
            builder.close();
        }
        (builder.finish(), model)
    }

    fn generator(config: GeneratorConfig) -> Generator {
        Generator::new(config, MarkerRegistry::autolog()).unwrap()
    }

    #[test]
    fn test_generator_rejects_invalid_config() {
        let config = GeneratorConfig {
            parallel_threshold: 0,
            ..Default::default()
        };
        assert!(Generator::new(config, MarkerRegistry::autolog()).is_err());
    }

    #[test]
    fn test_run_groups_declaration_and_member() {
        let (tree, model) = widget_snapshot(2);
        let output = generator(GeneratorConfig::sequential()).run(&tree, &model);

        assert_eq!(output.artifacts.len(), 2);
        assert_eq!(output.stats.findings, 3);
        let widget0 = output.artifact("Widget0.autolog.g.rs").unwrap();
        assert!(widget0.source_text.contains("log_class"));
        assert!(widget0.source_text.contains("log_method_render"));
        let widget1 = output.artifact("Widget1.autolog.g.rs").unwrap();
        assert!(!widget1.source_text.contains("log_class"));
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_empty_snapshot_still_publishes_markers() {
        let tree = SyntaxTree::default();
        let generator = generator(GeneratorConfig::default());
        let output = generator.run(&tree, &SymbolTable::new());
        assert!(output.artifacts.is_empty());

        let markers = generator.marker_declarations();
        assert_eq!(markers.kind, ArtifactKind::MarkerDeclarations);
        assert_eq!(markers.id, "autolog_markers.g.rs");
        assert!(markers.source_text.contains("auto_log_class"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (tree, model) = widget_snapshot(64);
        let sequential = generator(GeneratorConfig::sequential()).run(&tree, &model);
        let parallel = generator(GeneratorConfig::parallel()).run(&tree, &model);

        assert!(parallel.stats.parallel);
        assert!(!sequential.stats.parallel);
        assert_eq!(sequential.artifacts, parallel.artifacts);
    }

    #[test]
    fn test_cancelled_run_yields_no_output() {
        let (tree, model) = widget_snapshot(4);
        let token = CancellationToken::new();
        token.cancel();
        let result = generator(GeneratorConfig::default()).run_cancellable(&tree, &model, &token);
        assert!(matches!(result, Err(GenerationError::Cancelled)));
    }

    #[test]
    fn test_uncancelled_token_runs_normally() {
        let (tree, model) = widget_snapshot(4);
        let output = generator(GeneratorConfig::default()).run_cancellable(&tree, &model, &CancellationToken::new()).unwrap();
        assert_eq!(output.artifacts.len(), 4);
    }

    #[test]
    fn test_collision_surfaces_as_error_diagnostic() {
        let mut builder = SyntaxTree::builder();
        let mut model = SymbolTable::new();
        for _ in 0..2 {
            let imp = builder.open(NodeKind::Impl, Some("Widget"), vec![], None);
            model.declare(imp, DeclaredSymbol::new("Widget", ContainingNamespace::Global));
            let m = builder.leaf(NodeKind::Method, Some("render"), vec![AttributeSyntax::parse("auto_log_method")], None);
            model.bind_attribute(m, 0, SymbolPath::new(METHOD));
            builder.close();
        }
        let tree = builder.finish();

        let output = generator(GeneratorConfig::sequential()).run(&tree, &model);
        assert!(output.artifacts.is_empty());
        assert!(output.has_errors());
        assert_eq!(output.diagnostics[0].code, DiagnosticCode::DuplicateGeneratedMember);
    }

    #[test]
    fn test_stats_report_lists_stages() {
        let (tree, model) = widget_snapshot(1);
        let output = generator(GeneratorConfig::sequential()).run(&tree, &model);
        let report = output.stats.report();
        assert!(report.contains("resolution"));
        assert!(report.contains("collection"));
        assert!(report.contains("emission"));
        assert!(report.contains("total:"));
        assert_eq!(output.stats.stage_times.len(), 3);
        assert_eq!(output.stats.total_time(), output.stats.stage_times.values().sum::<Duration>());
    }

    proptest! {
        #[test]
        fn prop_runs_are_deterministic(count in 0usize..24, parallel in any::<bool>()) {
            let (tree, model) = widget_snapshot(count);
            let config = if parallel { GeneratorConfig::parallel() } else { GeneratorConfig::sequential() };
            let generator = generator(config);
            let first = generator.run(&tree, &model);
            let second = generator.run(&tree, &model);
            prop_assert_eq!(&first.artifacts, &second.artifacts);
            prop_assert_eq!(first.artifacts.len(), count);
        }

        #[test]
        fn prop_every_finding_passed_prefilter(count in 1usize..16) {
            let (tree, model) = widget_snapshot(count);
            let registry = MarkerRegistry::autolog();
            let resolver = Resolver::new(&tree, &model, &registry);
            for id in tree.node_ids() {
                if resolver.resolve(id).is_some() {
                    prop_assert!(is_candidate(tree.node(id)));
                }
            }
        }
    }
}

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

//! Autolog Core Library
//!
//! This crate discovers marker attributes on declarations of a syntax
//! snapshot, resolves each marked node to the type that owns it and
//! synthesizes one `impl` extension per owner. It is host agnostic: the
//! host lowers its sources into a [`SyntaxTree`] and answers name
//! resolution through a [`SemanticModel`].

pub mod artifact;
pub mod collector;
pub mod config;
pub mod diagnostics;
pub mod emitter;
pub mod error;
pub mod pipeline;
pub mod prefilter;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod semantic;
pub mod syntax;

// Re-export the run-level API for easy access
pub use artifact::{Artifact, ArtifactKind};
pub use config::GeneratorConfig;
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use error::{GenerationError, GenerationResult};
pub use pipeline::{CancellationToken, GenerationOutput, Generator, PipelineStats};
pub use registry::{MarkerKind, MarkerRegistry, MemberRole};
pub use render::{Renderer, RustRenderer};
pub use semantic::{ContainingNamespace, DeclaredSymbol, SemanticModel, SymbolPath, SymbolTable};
pub use syntax::{AttributeSyntax, NodeId, NodeKind, SourceLocation, SyntaxTree, SyntaxTreeBuilder};

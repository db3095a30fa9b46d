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

//! Autolog Frontend Library
//!
//! Rust source host for the autolog pipeline. Parses a crate's sources with
//! `syn`, resolves attribute paths through the crate's module scopes and
//! persists the generated extensions, typically from a build script:
//!
//! ```no_run
//! fn main() {
//!     autolog_frontend::init_logging();
//!     if let Err(e) = autolog_frontend::build_script() {
//!         panic!("autolog generation failed: {}", e);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod lower;
pub mod scope;
pub mod sink;
pub mod source;

pub use config::HostConfig;
pub use error::{FrontendError, FrontendResult};
pub use host::{GenerationReport, Host, build_script};
pub use logging::init_logging;
pub use lower::{LoweredCrate, lower};
pub use scope::ScopeModel;
pub use sink::{ArtifactSink, DirectorySink, MemorySink, WriteOutcome};
pub use source::SourceSet;

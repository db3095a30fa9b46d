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

//! Artifact persistence

use crate::error::{FrontendError, FrontendResult};
use autolog_core::artifact::{Artifact, ArtifactKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the manifest written next to the artifacts
pub const MANIFEST_FILE: &str = "autolog-manifest.json";

/// What happened to one persisted artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Destination for generated artifacts
pub trait ArtifactSink {
    fn persist(&mut self, artifact: &Artifact) -> FrontendResult<WriteOutcome>;

    /// Called once after every artifact of a run has been persisted.
    ///
    /// Artifacts of earlier runs that this run did not persist are gone afterwards.
    fn finish(&mut self) -> FrontendResult<()> {
        Ok(())
    }
}

/// Keeps artifacts in memory, keyed by id
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    artifacts: BTreeMap<String, Artifact>,
    order: Vec<String>,
    /// Ids persisted since the last `finish`
    run: BTreeSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Artifact> {
        self.artifacts.get(id)
    }

    /// Ids in the order they were persisted
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Extension artifacts only
    pub fn extensions(&self) -> impl Iterator<Item = &Artifact> {
        self.order.iter().filter_map(|id| self.artifacts.get(id)).filter(|a| a.kind == ArtifactKind::Extension)
    }
}

impl ArtifactSink for MemorySink {
    fn persist(&mut self, artifact: &Artifact) -> FrontendResult<WriteOutcome> {
        let outcome = match self.artifacts.get(&artifact.id) {
            Some(existing) if existing.fingerprint() == artifact.fingerprint() => WriteOutcome::Unchanged,
            Some(_) => WriteOutcome::Written,
            None => {
                self.order.push(artifact.id.clone());
                WriteOutcome::Written
            }
        };
        self.run.insert(artifact.id.clone());
        self.artifacts.insert(artifact.id.clone(), artifact.clone());
        Ok(outcome)
    }

    fn finish(&mut self) -> FrontendResult<()> {
        let run = std::mem::take(&mut self.run);
        self.artifacts.retain(|id, _| run.contains(id));
        self.order.retain(|id| run.contains(id));
        Ok(())
    }
}

/// One manifest line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub kind: ArtifactKind,
    pub fingerprint: String,
}

/// Ids and fingerprints of the artifacts of the last run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub artifacts: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn load(path: &Path) -> FrontendResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| FrontendError::io(path, e))?;
        serde_json::from_str(&text).map_err(FrontendError::Manifest)
    }
}

/// Writes each artifact to `<dir>/<id>`, skipping files whose content is unchanged.
///
/// The manifest of the previous run, if any, tells [`finish`](ArtifactSink::finish)
/// which files are left over and have to be removed.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    write_manifest: bool,
    /// Manifest of the last finished run
    manifest: Manifest,
    /// Entries persisted since then
    pending: Manifest,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> FrontendResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| FrontendError::io(&dir, e))?;
        let manifest = Self::previous_manifest(&dir);
        Ok(Self {
            dir,
            write_manifest: true,
            manifest,
            pending: Manifest::default(),
        })
    }

    fn previous_manifest(dir: &Path) -> Manifest {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Manifest::default();
        }
        Manifest::load(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unreadable manifest");
            Manifest::default()
        })
    }

    pub fn with_manifest(mut self, write_manifest: bool) -> Self {
        self.write_manifest = write_manifest;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Delete files listed by the previous manifest that the current run did not persist
    fn remove_stale(&self) -> FrontendResult<()> {
        let current: BTreeSet<&str> = self.pending.artifacts.iter().map(|e| e.id.as_str()).collect();
        for entry in &self.manifest.artifacts {
            // ids are bare file names; anything else did not come from this sink
            if current.contains(entry.id.as_str()) || Path::new(&entry.id).file_name().is_none_or(|name| name != entry.id.as_str()) {
                continue;
            }
            let path = self.dir.join(&entry.id);
            match fs::remove_file(&path) {
                Ok(()) => info!(artifact = %entry.id, "removed stale artifact"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(FrontendError::io(&path, e)),
            }
        }
        Ok(())
    }

    fn is_unchanged(path: &Path, artifact: &Artifact) -> bool {
        fs::read_to_string(path).is_ok_and(|existing| {
            let on_disk = Artifact {
                source_text: existing,
                ..artifact.clone()
            };
            on_disk.fingerprint() == artifact.fingerprint()
        })
    }
}

impl ArtifactSink for DirectorySink {
    fn persist(&mut self, artifact: &Artifact) -> FrontendResult<WriteOutcome> {
        let path = self.dir.join(&artifact.id);
        self.pending.artifacts.push(ManifestEntry {
            id: artifact.id.clone(),
            kind: artifact.kind,
            fingerprint: artifact.fingerprint(),
        });

        if Self::is_unchanged(&path, artifact) {
            debug!(artifact = %artifact.id, "artifact unchanged");
            return Ok(WriteOutcome::Unchanged);
        }
        fs::write(&path, &artifact.source_text).map_err(|e| FrontendError::io(&path, e))?;
        info!(artifact = %artifact.id, path = %path.display(), "wrote artifact");
        Ok(WriteOutcome::Written)
    }

    fn finish(&mut self) -> FrontendResult<()> {
        self.remove_stale()?;
        self.manifest = std::mem::take(&mut self.pending);

        let path = self.dir.join(MANIFEST_FILE);
        if !self.write_manifest {
            // a manifest left by an earlier run would describe files this run does not track
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != ErrorKind::NotFound {
                    return Err(FrontendError::io(&path, e));
                }
            }
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.manifest).map_err(FrontendError::Manifest)?;
        fs::write(&path, json).map_err(|e| FrontendError::io(&path, e))?;
        debug!(path = %path.display(), entries = self.manifest.artifacts.len(), "wrote manifest");
        Ok(())
    }
}

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

//! Source files of one crate, keyed by module path

use crate::error::{FrontendError, FrontendResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use syn::ext::IdentExt;
use syn::{Attribute, Expr, ExprLit, Item, Lit, Meta};
use tracing::debug;

/// One source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path used in diagnostics
    pub file_name: String,
    pub text: String,
}

/// Ordered map from module path (`""` for the crate root, `a::b` otherwise) to source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    files: BTreeMap<String, SourceFile>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the source of `module`
    pub fn insert(&mut self, module: impl Into<String>, file_name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.files.insert(
            module.into(),
            SourceFile {
                file_name: file_name.into(),
                text: text.into(),
            },
        );
        self
    }

    /// Load the crate rooted at `root` (a `src` directory).
    ///
    /// Starts from `lib.rs`, or `main.rs` when there is no library, and follows
    /// out-of-line `mod` declarations the way rustc does: `mod a;` in the crate
    /// root or a `mod.rs` is `a.rs` or `a/mod.rs` next to it, in `a.rs` it is
    /// looked up under `a/`. `#[path]` is honored on file-level declarations.
    /// Files no declaration reaches, such as `src/bin/*.rs`, are not loaded.
    pub fn from_dir(root: impl AsRef<Path>) -> FrontendResult<Self> {
        let root = root.as_ref();
        let entry = ["lib.rs", "main.rs"]
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| FrontendError::io(root, io::Error::new(ErrorKind::NotFound, "neither lib.rs nor main.rs exists")))?;

        let mut set = Self::new();
        let mut pending = vec![(String::new(), entry, root.to_path_buf())];
        while let Some((module, path, child_dir)) = pending.pop() {
            if set.files.contains_key(&module) {
                continue;
            }
            let text = fs::read_to_string(&path).map_err(|e| FrontendError::io(&path, e))?;
            let file_name = path.display().to_string();
            let parsed = syn::parse_file(&text).map_err(|e| FrontendError::syntax(&file_name, &e))?;

            let mut found = Vec::new();
            declared_modules(&parsed.items, &child_dir, path.parent().unwrap_or(root), true, &mut found);
            for declaration in found {
                let child = if module.is_empty() { declaration.module } else { format!("{}::{}", module, declaration.module) };
                match declaration.candidates.into_iter().find(|p| p.is_file()) {
                    Some(file) => {
                        let dir = child_dir_of(&file, declaration.explicit);
                        pending.push((child, file, dir));
                    }
                    None => debug!(module = %child, "no file for module declaration"),
                }
            }

            debug!(module = %module, file = %file_name, "loaded source");
            set.insert(module, file_name, text);
        }
        Ok(set)
    }

    pub fn get(&self, module: &str) -> Option<&SourceFile> {
        self.files.get(module)
    }

    /// Sources in module-path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceFile)> {
        self.files.iter().map(|(module, file)| (module.as_str(), file))
    }

    /// Files on disk, for `cargo:rerun-if-changed`
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.values().map(|f| f.file_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// An out-of-line `mod` declaration
struct ModDeclaration {
    /// Path relative to the declaring file's module
    module: String,
    candidates: Vec<PathBuf>,
    /// Located through `#[path]`
    explicit: bool,
}

/// Out-of-line `mod` declarations in `items` with their candidate files.
///
/// Inline modules are walked with their name appended to `dir`; `#[path]`
/// only applies at file level, relative to `file_dir`.
fn declared_modules(items: &[Item], dir: &Path, file_dir: &Path, file_level: bool, out: &mut Vec<ModDeclaration>) {
    for item in items {
        let Item::Mod(m) = item else { continue };
        let name = m.ident.unraw().to_string();
        match &m.content {
            Some((_, inner)) => {
                let mut found = Vec::new();
                declared_modules(inner, &dir.join(&name), file_dir, false, &mut found);
                out.extend(found.into_iter().map(|mut declaration| {
                    declaration.module = format!("{}::{}", name, declaration.module);
                    declaration
                }));
            }
            None => {
                let explicit = if file_level { path_attribute(&m.attrs).map(|p| file_dir.join(p)) } else { None };
                out.push(match explicit {
                    Some(path) => ModDeclaration { module: name, candidates: vec![path], explicit: true },
                    None => ModDeclaration {
                        candidates: vec![dir.join(format!("{}.rs", name)), dir.join(&name).join("mod.rs")],
                        module: name,
                        explicit: false,
                    },
                });
            }
        }
    }
}

fn path_attribute(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| match &attr.meta {
        Meta::NameValue(nv) if nv.path.is_ident("path") => match &nv.value {
            Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some(s.value()),
            _ => None,
        },
        _ => None,
    })
}

/// Directory holding the submodules of the module loaded from `file`.
///
/// `mod.rs` files and files named by `#[path]` keep their submodules next to them.
fn child_dir_of(file: &Path, explicit: bool) -> PathBuf {
    let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
    match file.file_stem().and_then(|s| s.to_str()) {
        Some(stem) if !explicit && stem != "mod" => parent.join(stem),
        _ => parent,
    }
}

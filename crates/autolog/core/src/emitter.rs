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

//! Grouping of collected targets by owner and artifact synthesis
//!
//! Groups are keyed by `(namespace, owner)` and visited in key order, so the
//! artifact list does not depend on traversal order. Inside a group, snippets
//! keep collector order. A group fails as a unit: an unnamed owner or a
//! snippet identifier collision drops that group's artifact and nothing else.

use crate::artifact::{Artifact, qualified_owner};
use crate::collector::Target;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::render::{Renderer, Snippet};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// All targets sharing one owner key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    pub namespace: &'a str,
    pub owner_name: Option<&'a str>,
    pub targets: Vec<&'a Target>,
}

/// Partition `targets` by `(namespace, owner)`, groups in key order, members in input order
pub fn group(targets: &[Target]) -> Vec<Group<'_>> {
    let mut groups: BTreeMap<(&str, Option<&str>), Vec<&Target>> = BTreeMap::new();
    for target in targets {
        groups.entry((target.owner_namespace.as_str(), target.owner_name.as_deref())).or_default().push(target);
    }
    groups
        .into_iter()
        .map(|((namespace, owner_name), targets)| Group { namespace, owner_name, targets })
        .collect()
}

/// Output of one emission pass
#[derive(Debug, Clone, Default)]
pub struct Emission {
    pub artifacts: Vec<Artifact>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns collected targets into one artifact per owner
pub struct Emitter<'r> {
    renderer: &'r dyn Renderer,
    suffix: &'r str,
}

impl<'r> Emitter<'r> {
    pub fn new(renderer: &'r dyn Renderer, suffix: &'r str) -> Self {
        Self { renderer, suffix }
    }

    pub fn emit(&self, targets: &[Target]) -> Emission {
        let mut emission = Emission::default();

        for group in group(targets) {
            let Some(owner_name) = group.owner_name else {
                debug!(namespace = group.namespace, findings = group.targets.len(), "dropping findings with an unnamed owner");
                emission.diagnostics.push(
                    Diagnostic::new(DiagnosticCode::UnnamedOwner, format!("{} finding(s) belong to an owner whose name could not be determined", group.targets.len()))
                        .with_location(group.targets.first().and_then(|t| t.location.clone())),
                );
                continue;
            };

            let snippets: Vec<Snippet> = group.targets.iter().map(|t| self.renderer.snippet(owner_name, &t.augmentation)).collect();

            let collisions = self.collisions(&group, &snippets);
            if !collisions.is_empty() {
                let owner = qualified_owner(group.namespace, owner_name);
                debug!(owner = %owner, collisions = collisions.len(), "skipping artifact with colliding generated members");
                emission.diagnostics.extend(collisions.into_iter().map(|d| d.with_owner(owner.clone())));
                continue;
            }

            let text = self.renderer.extension(group.namespace, owner_name, &snippets);
            let artifact = Artifact::extension(group.namespace, owner_name, self.suffix, text);
            debug!(artifact = %artifact.id, snippets = snippets.len(), "emitted extension");
            emission.artifacts.push(artifact);
        }

        emission
    }

    /// One diagnostic per repeated snippet identifier, at the repeating target
    fn collisions(&self, group: &Group<'_>, snippets: &[Snippet]) -> Vec<Diagnostic> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut diagnostics = Vec::new();
        for (index, snippet) in snippets.iter().enumerate() {
            if let Some(&first) = first_seen.get(snippet.ident.as_str()) {
                let origin = group.targets[first].location.as_ref().map(|l| format!(" (first defined for {})", l)).unwrap_or_default();
                diagnostics.push(
                    Diagnostic::new(DiagnosticCode::DuplicateGeneratedMember, format!("generated member `{}` would be defined twice{}", snippet.ident, origin))
                        .with_location(group.targets[index].location.clone()),
                );
            } else {
                first_seen.insert(snippet.ident.as_str(), index);
            }
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemberRole;
    use crate::render::RustRenderer;
    use crate::resolver::Augmentation;
    use crate::semantic::SymbolPath;
    use crate::syntax::SourceLocation;

    const SUFFIX: &str = ".autolog.g.rs";

    fn target(namespace: &str, owner: Option<&str>, augmentation: Augmentation) -> Target {
        Target {
            owner_name: owner.map(str::to_string),
            owner_namespace: namespace.to_string(),
            augmentation,
            marker: SymbolPath::new("autolog::auto_log_class"),
            location: None,
        }
    }

    fn method(name: &str) -> Augmentation {
        Augmentation::Member { name: name.into(), role: MemberRole::Method }
    }

    #[test]
    fn test_group_keys_sorted_members_in_order() {
        let targets = vec![
            target("", Some("B"), method("run")),
            target("", Some("A"), Augmentation::Declaration),
            target("", Some("B"), Augmentation::Declaration),
        ];
        let groups = group(&targets);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].owner_name, Some("A"));
        assert_eq!(groups[1].targets[0].augmentation, method("run"));
        assert_eq!(groups[1].targets[1].augmentation, Augmentation::Declaration);
    }

    #[test]
    fn test_one_artifact_per_owner_with_snippets_in_order() {
        let targets = vec![target("ui", Some("Widget"), Augmentation::Declaration), target("ui", Some("Widget"), method("render"))];
        let emission = Emitter::new(&RustRenderer, SUFFIX).emit(&targets);

        assert_eq!(emission.artifacts.len(), 1);
        let artifact = &emission.artifacts[0];
        assert_eq!(artifact.id, "ui.Widget.autolog.g.rs");
        let class_at = artifact.source_text.find("log_class").unwrap();
        let method_at = artifact.source_text.find("log_method_render").unwrap();
        assert!(class_at < method_at);
    }

    #[test]
    fn test_same_name_different_namespace_are_separate() {
        let targets = vec![target("a", Some("Widget"), Augmentation::Declaration), target("b", Some("Widget"), Augmentation::Declaration)];
        let emission = Emitter::new(&RustRenderer, SUFFIX).emit(&targets);
        let ids: Vec<_> = emission.artifacts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a.Widget.autolog.g.rs", "b.Widget.autolog.g.rs"]);
    }

    #[test]
    fn test_unnamed_owner_group_is_dropped() {
        let targets = vec![target("", None, method("run")), target("", Some("Widget"), Augmentation::Declaration)];
        let emission = Emitter::new(&RustRenderer, SUFFIX).emit(&targets);
        assert_eq!(emission.artifacts.len(), 1);
        assert_eq!(emission.artifacts[0].owner_name, "Widget");
        assert_eq!(emission.diagnostics[0].code, DiagnosticCode::UnnamedOwner);
    }

    #[test]
    fn test_collision_fails_only_that_artifact() {
        let mut dup = target("", Some("Widget"), method("render"));
        dup.location = Some(SourceLocation::new("src/lib.rs", 20));
        let targets = vec![target("", Some("Widget"), method("render")), dup, target("", Some("Other"), method("render"))];

        let emission = Emitter::new(&RustRenderer, SUFFIX).emit(&targets);
        assert_eq!(emission.artifacts.len(), 1);
        assert_eq!(emission.artifacts[0].owner_name, "Other");
        assert_eq!(emission.diagnostics.len(), 1);
        let diagnostic = &emission.diagnostics[0];
        assert_eq!(diagnostic.code, DiagnosticCode::DuplicateGeneratedMember);
        assert_eq!(diagnostic.owner.as_deref(), Some("Widget"));
        assert_eq!(diagnostic.location, Some(SourceLocation::new("src/lib.rs", 20)));
    }

    #[test]
    fn test_empty_input_emits_nothing() {
        let emission = Emitter::new(&RustRenderer, SUFFIX).emit(&[]);
        assert!(emission.artifacts.is_empty());
        assert!(emission.diagnostics.is_empty());
    }
}

//! Effective (inherited, interpolated, profile-filtered) views of a [`Model`].

use super::dependency::{Dependency, Exclusion};
use super::interpolate::{Interpolated, interpolate};
use super::pom::RawDependency;
use super::{Model, Properties};
use crate::coordinate::{ArtifactKey, Gav, Scope};
use crate::core::MvnrError;
use crate::profile::ProfileConstraints;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// An effective dependency list plus the non-fatal problems found while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveDependencies {
    pub dependencies: Vec<Dependency>,
    pub warnings: Vec<String>,
}

/// A dependency as declared, before management back-fill.
struct Declared {
    dependency: Dependency,
    explicit_scope: bool,
    version_unresolved: Option<String>,
}

impl Model {
    /// Properties visible to this model.
    ///
    /// Environment fallbacks (`java.version`, `os.*`) come first, then each ancestor's
    /// `<properties>` from the root down with that level's active profiles applied on top,
    /// then the constraint properties, and finally the `project.*` built-ins.
    #[must_use]
    pub fn effective_properties(&self, constraints: &ProfileConstraints) -> Properties {
        let mut properties = Properties::new();

        let environment = [
            ("java.version", constraints.jdk()),
            ("os.name", constraints.os_name()),
            ("os.arch", constraints.os_arch()),
            ("os.version", constraints.os_version()),
        ];
        for (key, value) in environment {
            if let Some(value) = value {
                properties.insert(key.to_string(), value.to_string());
            }
        }

        for level in self.lineage() {
            properties.extend(level.pom.properties.iter().cloned());
            for profile in level.active_profiles(constraints) {
                properties.extend(profile.properties.iter().cloned());
            }
        }

        properties.extend(constraints.properties().iter().map(|(k, v)| (k.clone(), v.clone())));

        let builtins = [
            ("groupId", self.gav.group_id.clone()),
            ("artifactId", self.gav.artifact_id.clone()),
            ("version", self.gav.version.clone()),
            ("packaging", self.packaging().to_string()),
        ];
        for (field, value) in builtins {
            properties.insert(format!("project.{field}"), value.clone());
            properties.insert(format!("pom.{field}"), value);
        }
        if let Some(parent) = self.parent_ref() {
            properties.insert("project.parent.groupId".to_string(), parent.group_id);
            properties.insert("project.parent.artifactId".to_string(), parent.artifact_id);
            properties.insert("project.parent.version".to_string(), parent.version);
        }
        if let Some(basedir) = constraints.basedir() {
            let basedir = basedir.to_string_lossy().into_owned();
            properties.insert("project.basedir".to_string(), basedir.clone());
            properties.insert("basedir".to_string(), basedir);
        }
        properties
    }

    /// Interpolate text with this model's effective properties.
    #[must_use]
    pub fn interpolate(&self, text: &str, constraints: &ProfileConstraints) -> Interpolated {
        interpolate(text, &self.effective_properties(constraints))
    }

    /// The effective dependency list.
    ///
    /// With `managed = true` this is the dependency management: explicit entries merged
    /// over the parent chain (child wins), followed by entries from imported BOMs that
    /// are not already managed (earlier imports win). An unresolved placeholder in a
    /// managed version is an error.
    ///
    /// With `managed = false` this is the direct dependency list: this model's
    /// declarations and those of its active profiles, then inherited ones not redeclared,
    /// with version, scope, and exclusions back-filled from management.
    ///
    /// # Errors
    ///
    /// - [`MvnrError::UnresolvedProperty`] for a placeholder in a managed version, or in
    ///   the version of a compile/runtime dependency
    /// - [`MvnrError::UnresolvedVersion`] for a compile/runtime dependency without any
    ///   version
    /// - [`MvnrError::MalformedDescriptor`] for a dependency without groupId/artifactId
    pub fn dependencies(
        &self,
        managed: bool,
        constraints: &ProfileConstraints,
    ) -> Result<EffectiveDependencies, MvnrError> {
        let properties = self.effective_properties(constraints);
        let mut warnings = Vec::new();
        let dependencies = if managed {
            self.managed_dependencies(&properties, constraints, &mut warnings)?
        } else {
            self.direct_dependencies(&properties, constraints, &[], &mut warnings)?
        };
        for warning in &warnings {
            warn!("{warning}");
        }
        Ok(EffectiveDependencies {
            dependencies,
            warnings,
        })
    }

    /// The direct dependency list with extra management applied after this model's own.
    ///
    /// Entries in `external` only fill in keys this model does not manage itself. The
    /// resolver passes BOM management supplied by the caller here.
    ///
    /// # Errors
    ///
    /// Same as [`Model::dependencies`].
    pub fn dependencies_with_management(
        &self,
        external: &[Dependency],
        constraints: &ProfileConstraints,
    ) -> Result<EffectiveDependencies, MvnrError> {
        let properties = self.effective_properties(constraints);
        let mut warnings = Vec::new();
        let dependencies =
            self.direct_dependencies(&properties, constraints, external, &mut warnings)?;
        for warning in &warnings {
            warn!("{warning}");
        }
        Ok(EffectiveDependencies {
            dependencies,
            warnings,
        })
    }

    /// Coordinates of BOMs imported anywhere in the inheritance chain, this model's own
    /// imports first.
    ///
    /// # Errors
    ///
    /// Returns [`MvnrError::UnresolvedProperty`] when an import coordinate contains an
    /// unresolvable placeholder.
    pub fn import_requests(&self, constraints: &ProfileConstraints) -> Result<Vec<Gav>, MvnrError> {
        let properties = self.effective_properties(constraints);
        let mut requests: Vec<Gav> = Vec::new();

        for level in self.lineage().into_iter().rev() {
            for raw in level.management_declarations(constraints) {
                if !raw.is_import() {
                    continue;
                }
                let field = |value: &Option<String>, name: &str| -> Result<String, MvnrError> {
                    let text = value.as_deref().unwrap_or_default();
                    let result = interpolate(text, &properties);
                    if let Some(property) = result.unresolved.first() {
                        return Err(MvnrError::UnresolvedProperty {
                            property: property.clone(),
                            location: format!("BOM import {name}"),
                            coordinate: self.gav.to_string(),
                        });
                    }
                    if result.text.is_empty() {
                        return Err(MvnrError::MalformedDescriptor {
                            coordinate: level.gav.to_string(),
                            reason: format!("BOM import is missing <{name}>"),
                        });
                    }
                    Ok(result.text)
                };
                let gav = Gav::new(
                    field(&raw.group_id, "groupId")?,
                    field(&raw.artifact_id, "artifactId")?,
                    field(&raw.version, "version")?,
                );
                if !requests.contains(&gav) {
                    requests.push(gav);
                }
            }
        }
        Ok(requests)
    }

    /// Raw management entries of this level, own entries before active-profile entries.
    fn management_declarations<'a>(
        &'a self,
        constraints: &ProfileConstraints,
    ) -> impl Iterator<Item = &'a RawDependency> + use<'a> {
        let profiles = self.active_profiles(constraints);
        self.pom
            .dependency_management
            .iter()
            .chain(profiles.into_iter().flat_map(|p| p.dependency_management.iter()))
    }

    /// Raw dependency entries of this level, own entries before active-profile entries.
    fn dependency_declarations<'a>(
        &'a self,
        constraints: &ProfileConstraints,
    ) -> impl Iterator<Item = &'a RawDependency> + use<'a> {
        let profiles = self.active_profiles(constraints);
        self.pom
            .dependencies
            .iter()
            .chain(profiles.into_iter().flat_map(|p| p.dependencies.iter()))
    }

    fn managed_dependencies(
        &self,
        properties: &Properties,
        constraints: &ProfileConstraints,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<Dependency>, MvnrError> {
        let mut managed: Vec<Dependency> = Vec::new();
        let mut index: HashMap<ArtifactKey, usize> = HashMap::new();

        for level in self.lineage() {
            for raw in level.management_declarations(constraints) {
                if raw.is_import() {
                    continue;
                }
                let declared = self.declare(level, raw, properties, warnings)?;
                if let Some(property) = declared.version_unresolved {
                    return Err(MvnrError::UnresolvedProperty {
                        property,
                        location: format!(
                            "managed version of {}:{}",
                            declared.dependency.group_id, declared.dependency.artifact_id
                        ),
                        coordinate: level.gav.to_string(),
                    });
                }
                let key = declared.dependency.key();
                match index.get(&key) {
                    Some(&position) => managed[position] = declared.dependency,
                    None => {
                        index.insert(key, managed.len());
                        managed.push(declared.dependency);
                    }
                }
            }
        }

        for gav in self.import_requests(constraints)? {
            let bom = self.import(&gav).ok_or_else(|| MvnrError::DescriptorNotFound {
                coordinate: gav.to_string(),
            })?;
            let bom_properties = bom.effective_properties(constraints);
            for entry in bom.managed_dependencies(&bom_properties, constraints, warnings)? {
                let key = entry.key();
                if !index.contains_key(&key) {
                    index.insert(key, managed.len());
                    managed.push(entry);
                }
            }
        }

        debug!("{} manages {} dependencies", self.gav, managed.len());
        Ok(managed)
    }

    fn direct_dependencies(
        &self,
        properties: &Properties,
        constraints: &ProfileConstraints,
        external: &[Dependency],
        warnings: &mut Vec<String>,
    ) -> Result<Vec<Dependency>, MvnrError> {
        let mut management: HashMap<ArtifactKey, Dependency> = self
            .managed_dependencies(properties, constraints, warnings)?
            .into_iter()
            .map(|d| (d.key(), d))
            .collect();
        for entry in external {
            management.entry(entry.key()).or_insert_with(|| entry.clone());
        }

        let mut seen: HashSet<ArtifactKey> = HashSet::new();
        let mut result = Vec::new();

        for level in self.lineage().into_iter().rev() {
            let mut level_keys: HashSet<ArtifactKey> = HashSet::new();
            for raw in level.dependency_declarations(constraints) {
                let mut declared = self.declare(level, raw, properties, warnings)?;
                let key = declared.dependency.key();
                if seen.contains(&key) {
                    if level_keys.contains(&key) {
                        warnings.push(format!(
                            "{} declares {} more than once; keeping the first declaration",
                            level.gav, key
                        ));
                    }
                    continue;
                }

                if let Some(entry) = management.get(&key) {
                    let dependency = &mut declared.dependency;
                    if !dependency.has_version() {
                        dependency.version.clone_from(&entry.version);
                    }
                    if !declared.explicit_scope {
                        dependency.scope = entry.scope;
                    }
                    dependency.exclusions.extend(entry.exclusions.iter().cloned());
                }

                let dependency = declared.dependency;
                let transitive = dependency.scope.is_transitive();
                if let Some(property) = declared.version_unresolved {
                    if transitive {
                        return Err(MvnrError::UnresolvedProperty {
                            property,
                            location: format!(
                                "version of {}:{}",
                                dependency.group_id, dependency.artifact_id
                            ),
                            coordinate: level.gav.to_string(),
                        });
                    }
                    warnings.push(format!(
                        "Dropping {}:{} ({}) from {}: unresolved property '{property}' in version",
                        dependency.group_id, dependency.artifact_id, dependency.scope, level.gav
                    ));
                    continue;
                }
                if !dependency.has_version() {
                    if transitive {
                        return Err(MvnrError::UnresolvedVersion {
                            coordinate: format!(
                                "{}:{} (declared in {})",
                                dependency.group_id, dependency.artifact_id, level.gav
                            ),
                            reason: "no version declared and none managed".to_string(),
                        });
                    }
                    warnings.push(format!(
                        "Dropping {}:{} ({}) from {}: no version declared and none managed",
                        dependency.group_id, dependency.artifact_id, dependency.scope, level.gav
                    ));
                    continue;
                }

                seen.insert(key.clone());
                level_keys.insert(key);
                result.push(dependency);
            }
        }
        Ok(result)
    }

    /// Interpolate one raw declaration with the leaf's properties.
    fn declare(
        &self,
        level: &Model,
        raw: &RawDependency,
        properties: &Properties,
        warnings: &mut Vec<String>,
    ) -> Result<Declared, MvnrError> {
        let mut field = |value: &Option<String>, name: &str| -> Option<String> {
            let text = value.as_deref()?;
            let result = interpolate(text, properties);
            if name != "version" {
                for property in &result.unresolved {
                    warnings.push(format!(
                        "Unresolved property '{property}' in dependency {name} '{text}' of {}",
                        level.gav
                    ));
                }
            }
            Some(result.text).filter(|t| !t.is_empty())
        };

        let group_id = field(&raw.group_id, "groupId");
        let artifact_id = field(&raw.artifact_id, "artifactId");
        let (Some(group_id), Some(artifact_id)) = (group_id, artifact_id) else {
            return Err(MvnrError::MalformedDescriptor {
                coordinate: level.gav.to_string(),
                reason: "dependency is missing <groupId> or <artifactId>".to_string(),
            });
        };

        let version = field(&raw.version, "version").unwrap_or_default();
        let version_unresolved = interpolate(&version, properties).unresolved.into_iter().next();
        let classifier = field(&raw.classifier, "classifier");
        let packaging = field(&raw.packaging, "type");
        let scope_text = field(&raw.scope, "scope");
        let optional_text = field(&raw.optional, "optional");

        let scope = match scope_text.as_deref() {
            Some(text) => text.parse::<Scope>().unwrap_or_else(|_| {
                warnings.push(format!(
                    "Unknown scope '{text}' for {group_id}:{artifact_id} in {}; using compile",
                    level.gav
                ));
                Scope::Compile
            }),
            None => Scope::Compile,
        };

        let exclusions = raw
            .exclusions
            .iter()
            .map(|e| {
                Exclusion::new(
                    interpolate(&e.group_id, properties).text,
                    interpolate(&e.artifact_id, properties).text,
                )
            })
            .collect();

        let mut dependency = Dependency::new(group_id, artifact_id, version);
        dependency.classifier = classifier;
        if let Some(packaging) = packaging {
            dependency.packaging = packaging;
        }
        dependency.scope = scope;
        dependency.optional = optional_text.is_some_and(|t| t.eq_ignore_ascii_case("true"));
        dependency.exclusions = exclusions;

        Ok(Declared {
            dependency,
            explicit_scope: scope_text.is_some(),
            version_unresolved,
        })
    }
}

//! Raw POM documents.
//!
//! [`Pom`] mirrors the XML with no inheritance, interpolation, or profile filtering
//! applied. Every text field is kept as written so that later stages can interpolate it
//! with the properties of whichever descendant is being evaluated.

use crate::core::MvnrError;
use crate::profile::{ActivationRule, FileActivation, OsActivation, PropertyActivation};
use roxmltree::{Document, Node};

/// `<parent>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// `<exclusion>` as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExclusion {
    pub group_id: String,
    pub artifact_id: String,
}

/// `<dependency>` as written. Absent elements are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub classifier: Option<String>,
    pub packaging: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<String>,
    pub exclusions: Vec<RawExclusion>,
}

impl RawDependency {
    /// A `<scope>import</scope>` entry with `<type>pom</type>`.
    #[must_use]
    pub fn is_import(&self) -> bool {
        self.scope.as_deref().is_some_and(|s| s.trim().eq_ignore_ascii_case("import"))
            && self.packaging.as_deref().is_some_and(|t| t.trim().eq_ignore_ascii_case("pom"))
    }
}

/// `<profile>` as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub activation: ActivationRule,
    pub properties: Vec<(String, String)>,
    pub dependencies: Vec<RawDependency>,
    pub dependency_management: Vec<RawDependency>,
}

/// A parsed project descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    /// Properties in document order.
    pub properties: Vec<(String, String)>,
    pub dependency_management: Vec<RawDependency>,
    pub dependencies: Vec<RawDependency>,
    pub profiles: Vec<Profile>,
}

impl Pom {
    /// Parse POM bytes. `label` names the descriptor in errors.
    ///
    /// # Errors
    ///
    /// Returns [`MvnrError::MalformedDescriptor`] for invalid UTF-8, invalid XML, a root
    /// element other than `<project>`, or an incomplete `<parent>`.
    pub fn parse(label: &str, bytes: &[u8]) -> Result<Self, MvnrError> {
        let malformed = |reason: String| MvnrError::MalformedDescriptor {
            coordinate: label.to_string(),
            reason,
        };

        let text = std::str::from_utf8(bytes).map_err(|e| malformed(format!("not UTF-8: {e}")))?;
        let document = Document::parse(text).map_err(|e| malformed(format!("invalid XML: {e}")))?;
        let project = document.root_element();
        if project.tag_name().name() != "project" {
            return Err(malformed(format!(
                "root element is <{}>, expected <project>",
                project.tag_name().name()
            )));
        }

        let parent = match child(project, "parent") {
            Some(node) => Some(parse_parent(node).map_err(malformed)?),
            None => None,
        };

        Ok(Self {
            group_id: child_value(project, "groupId"),
            artifact_id: child_value(project, "artifactId"),
            version: child_value(project, "version"),
            packaging: child_value(project, "packaging"),
            parent,
            properties: parse_properties(project),
            dependency_management: parse_dependency_management(project),
            dependencies: parse_dependencies(project),
            profiles: child(project, "profiles")
                .map(|profiles| elements(profiles, "profile").map(parse_profile).collect())
                .unwrap_or_default(),
        })
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.is_element() && c.tag_name().name() == name)
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| c.is_element() && c.tag_name().name() == name)
}

/// Trimmed text of a child element; `Some("")` when the element is present but empty.
fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name).map(|c| c.text().unwrap_or_default().trim().to_string())
}

/// Trimmed, non-empty text of a child element.
fn child_value(node: Node<'_, '_>, name: &str) -> Option<String> {
    child_text(node, name).filter(|text| !text.is_empty())
}

fn parse_parent(node: Node<'_, '_>) -> Result<ParentRef, String> {
    let field = |name: &str| {
        child_value(node, name).ok_or_else(|| format!("<parent> is missing <{name}>"))
    };
    Ok(ParentRef {
        group_id: field("groupId")?,
        artifact_id: field("artifactId")?,
        version: field("version")?,
    })
}

fn parse_properties(node: Node<'_, '_>) -> Vec<(String, String)> {
    child(node, "properties")
        .map(|props| {
            props
                .children()
                .filter(Node::is_element)
                .map(|prop| {
                    let value = prop.text().unwrap_or_default().trim().to_string();
                    (prop.tag_name().name().to_string(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_dependency_list(node: Option<Node<'_, '_>>) -> Vec<RawDependency> {
    node.map(|deps| elements(deps, "dependency").map(parse_dependency).collect())
        .unwrap_or_default()
}

fn parse_dependencies(node: Node<'_, '_>) -> Vec<RawDependency> {
    parse_dependency_list(child(node, "dependencies"))
}

fn parse_dependency_management(node: Node<'_, '_>) -> Vec<RawDependency> {
    parse_dependency_list(
        child(node, "dependencyManagement").and_then(|m| child(m, "dependencies")),
    )
}

fn parse_dependency(node: Node<'_, '_>) -> RawDependency {
    let exclusions = child(node, "exclusions")
        .map(|exclusions| {
            elements(exclusions, "exclusion")
                .filter_map(|exclusion| {
                    Some(RawExclusion {
                        group_id: child_value(exclusion, "groupId")?,
                        artifact_id: child_value(exclusion, "artifactId")
                            .unwrap_or_else(|| "*".to_string()),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    RawDependency {
        group_id: child_value(node, "groupId"),
        artifact_id: child_value(node, "artifactId"),
        version: child_value(node, "version"),
        classifier: child_value(node, "classifier"),
        packaging: child_value(node, "type"),
        scope: child_value(node, "scope"),
        optional: child_value(node, "optional"),
        exclusions,
    }
}

fn parse_activation(node: Node<'_, '_>) -> ActivationRule {
    let os = child(node, "os").map(|os| OsActivation {
        name: child_text(os, "name"),
        family: child_text(os, "family"),
        arch: child_text(os, "arch"),
        version: child_text(os, "version"),
    });
    let property = child(node, "property").map(|property| PropertyActivation {
        name: child_text(property, "name").unwrap_or_default(),
        value: child_text(property, "value"),
    });
    let file = child(node, "file").map(|file| FileActivation {
        exists: child_text(file, "exists"),
        missing: child_text(file, "missing"),
    });
    ActivationRule {
        os,
        jdk: child_text(node, "jdk"),
        property,
        file,
    }
}

fn parse_profile(node: Node<'_, '_>) -> Profile {
    Profile {
        id: child_value(node, "id").unwrap_or_else(|| "default".to_string()),
        activation: child(node, "activation").map(parse_activation).unwrap_or_default(),
        properties: parse_properties(node),
        dependencies: parse_dependencies(node),
        dependency_management: parse_dependency_management(node),
    }
}

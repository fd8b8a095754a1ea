//! Test fixtures for building POM documents
//!
//! [`PomBuilder`] writes well-formed POM XML from a few builder calls, so tests can
//! describe a dependency graph without embedding large XML literals.

use std::fmt::Write as _;

/// A `<dependency>` entry for [`PomBuilder`]
#[derive(Clone, Debug, Default)]
pub struct DependencyFixture {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub classifier: Option<String>,
    pub packaging: Option<String>,
    pub scope: Option<String>,
    pub optional: bool,
    pub exclusions: Vec<(String, String)>,
}

impl DependencyFixture {
    /// Parse `groupId:artifactId[:version]`
    ///
    /// # Panics
    ///
    /// Panics if the text has fewer than two fields.
    pub fn new(coordinate: &str) -> Self {
        let mut parts = coordinate.split(':');
        let group_id = parts.next().unwrap_or_default().to_string();
        let artifact_id = parts.next().unwrap_or_default().to_string();
        assert!(
            !group_id.is_empty() && !artifact_id.is_empty(),
            "bad fixture coordinate {coordinate}"
        );
        Self {
            group_id,
            artifact_id,
            version: parts.next().filter(|v| !v.is_empty()).map(str::to_string),
            ..Self::default()
        }
    }

    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn classifier(mut self, classifier: &str) -> Self {
        self.classifier = Some(classifier.to_string());
        self
    }

    pub fn packaging(mut self, packaging: &str) -> Self {
        self.packaging = Some(packaging.to_string());
        self
    }

    pub fn exclude(mut self, group_id: &str, artifact_id: &str) -> Self {
        self.exclusions.push((group_id.to_string(), artifact_id.to_string()));
        self
    }

    fn write_xml(&self, out: &mut String, indent: &str) {
        let _ = writeln!(out, "{indent}<dependency>");
        let _ = writeln!(out, "{indent}  <groupId>{}</groupId>", self.group_id);
        let _ = writeln!(out, "{indent}  <artifactId>{}</artifactId>", self.artifact_id);
        if let Some(version) = &self.version {
            let _ = writeln!(out, "{indent}  <version>{version}</version>");
        }
        if let Some(classifier) = &self.classifier {
            let _ = writeln!(out, "{indent}  <classifier>{classifier}</classifier>");
        }
        if let Some(packaging) = &self.packaging {
            let _ = writeln!(out, "{indent}  <type>{packaging}</type>");
        }
        if let Some(scope) = &self.scope {
            let _ = writeln!(out, "{indent}  <scope>{scope}</scope>");
        }
        if self.optional {
            let _ = writeln!(out, "{indent}  <optional>true</optional>");
        }
        if !self.exclusions.is_empty() {
            let _ = writeln!(out, "{indent}  <exclusions>");
            for (group_id, artifact_id) in &self.exclusions {
                let _ = writeln!(
                    out,
                    "{indent}    <exclusion><groupId>{group_id}</groupId><artifactId>{artifact_id}</artifactId></exclusion>"
                );
            }
            let _ = writeln!(out, "{indent}  </exclusions>");
        }
        let _ = writeln!(out, "{indent}</dependency>");
    }
}

impl From<&str> for DependencyFixture {
    fn from(coordinate: &str) -> Self {
        Self::new(coordinate)
    }
}

/// A `<profile>` entry for [`PomBuilder`]
#[derive(Clone, Debug, Default)]
pub struct ProfileFixture {
    pub id: String,
    pub activation: Vec<String>,
    pub properties: Vec<(String, String)>,
    pub dependencies: Vec<DependencyFixture>,
    pub managed: Vec<DependencyFixture>,
}

impl ProfileFixture {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn os_name(mut self, name: &str) -> Self {
        self.activation.push(format!("<os><name>{name}</name></os>"));
        self
    }

    pub fn jdk(mut self, expression: &str) -> Self {
        self.activation.push(format!("<jdk>{expression}</jdk>"));
        self
    }

    pub fn when_property(mut self, name: &str, value: Option<&str>) -> Self {
        let value = value.map(|v| format!("<value>{v}</value>")).unwrap_or_default();
        self.activation.push(format!("<property><name>{name}</name>{value}</property>"));
        self
    }

    pub fn when_file_exists(mut self, path: &str) -> Self {
        self.activation.push(format!("<file><exists>{path}</exists></file>"));
        self
    }

    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.properties.push((key.to_string(), value.to_string()));
        self
    }

    pub fn dependency(mut self, dependency: impl Into<DependencyFixture>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn managed(mut self, dependency: impl Into<DependencyFixture>) -> Self {
        self.managed.push(dependency.into());
        self
    }
}

/// Builder for POM XML documents
///
/// # Example
///
/// ```rust,no_run
/// use mvnr_cli::test_utils::{DependencyFixture, PomBuilder};
///
/// let xml = PomBuilder::new("org.example:app:1.0.0")
///     .property("lib.version", "1.5.0")
///     .dependency("org.example:lib:${lib.version}")
///     .dependency(DependencyFixture::new("junit:junit:4.13").scope("test"))
///     .build();
/// assert!(xml.contains("<artifactId>lib</artifactId>"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct PomBuilder {
    group_id: Option<String>,
    artifact_id: String,
    version: Option<String>,
    packaging: Option<String>,
    parent: Option<(String, String, String)>,
    properties: Vec<(String, String)>,
    dependencies: Vec<DependencyFixture>,
    managed: Vec<DependencyFixture>,
    profiles: Vec<ProfileFixture>,
}

impl PomBuilder {
    /// Start a POM for `groupId:artifactId:version`
    pub fn new(coordinate: &str) -> Self {
        let fixture = DependencyFixture::new(coordinate);
        Self {
            group_id: Some(fixture.group_id),
            artifact_id: fixture.artifact_id,
            version: fixture.version,
            ..Self::default()
        }
    }

    /// Inherit groupId and version from the parent instead of declaring them
    pub fn inherit_group_and_version(mut self) -> Self {
        self.group_id = None;
        self.version = None;
        self
    }

    pub fn parent(mut self, coordinate: &str) -> Self {
        let fixture = DependencyFixture::new(coordinate);
        self.parent =
            Some((fixture.group_id, fixture.artifact_id, fixture.version.unwrap_or_default()));
        self
    }

    pub fn packaging(mut self, packaging: &str) -> Self {
        self.packaging = Some(packaging.to_string());
        self
    }

    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.properties.push((key.to_string(), value.to_string()));
        self
    }

    pub fn dependency(mut self, dependency: impl Into<DependencyFixture>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn managed(mut self, dependency: impl Into<DependencyFixture>) -> Self {
        self.managed.push(dependency.into());
        self
    }

    /// Add a `<scope>import</scope>` BOM entry to dependency management
    pub fn import_bom(self, coordinate: &str) -> Self {
        self.managed(DependencyFixture::new(coordinate).packaging("pom").scope("import"))
    }

    pub fn profile(mut self, profile: ProfileFixture) -> Self {
        self.profiles.push(profile);
        self
    }

    /// Render the XML document
    pub fn build(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n");
        out.push_str("  <modelVersion>4.0.0</modelVersion>\n");
        if let Some((group_id, artifact_id, version)) = &self.parent {
            let _ = writeln!(
                out,
                "  <parent><groupId>{group_id}</groupId><artifactId>{artifact_id}</artifactId><version>{version}</version></parent>"
            );
        }
        if let Some(group_id) = &self.group_id {
            let _ = writeln!(out, "  <groupId>{group_id}</groupId>");
        }
        let _ = writeln!(out, "  <artifactId>{}</artifactId>", self.artifact_id);
        if let Some(version) = &self.version {
            let _ = writeln!(out, "  <version>{version}</version>");
        }
        if let Some(packaging) = &self.packaging {
            let _ = writeln!(out, "  <packaging>{packaging}</packaging>");
        }
        write_properties(&mut out, &self.properties, "  ");
        write_management(&mut out, &self.managed, "  ");
        write_dependencies(&mut out, &self.dependencies, "  ");
        if !self.profiles.is_empty() {
            out.push_str("  <profiles>\n");
            for profile in &self.profiles {
                out.push_str("    <profile>\n");
                let _ = writeln!(out, "      <id>{}</id>", profile.id);
                if !profile.activation.is_empty() {
                    let activation = profile.activation.join("");
                    let _ = writeln!(out, "      <activation>{activation}</activation>");
                }
                write_properties(&mut out, &profile.properties, "      ");
                write_management(&mut out, &profile.managed, "      ");
                write_dependencies(&mut out, &profile.dependencies, "      ");
                out.push_str("    </profile>\n");
            }
            out.push_str("  </profiles>\n");
        }
        out.push_str("</project>\n");
        out
    }

    /// Render the XML document as bytes
    pub fn bytes(&self) -> Vec<u8> {
        self.build().into_bytes()
    }
}

fn write_properties(out: &mut String, properties: &[(String, String)], indent: &str) {
    if properties.is_empty() {
        return;
    }
    let _ = writeln!(out, "{indent}<properties>");
    for (key, value) in properties {
        let _ = writeln!(out, "{indent}  <{key}>{value}</{key}>");
    }
    let _ = writeln!(out, "{indent}</properties>");
}

fn write_dependencies(out: &mut String, dependencies: &[DependencyFixture], indent: &str) {
    if dependencies.is_empty() {
        return;
    }
    let _ = writeln!(out, "{indent}<dependencies>");
    let inner = format!("{indent}  ");
    for dependency in dependencies {
        dependency.write_xml(out, &inner);
    }
    let _ = writeln!(out, "{indent}</dependencies>");
}

fn write_management(out: &mut String, dependencies: &[DependencyFixture], indent: &str) {
    if dependencies.is_empty() {
        return;
    }
    let _ = writeln!(out, "{indent}<dependencyManagement>");
    write_dependencies(out, dependencies, &format!("{indent}  "));
    let _ = writeln!(out, "{indent}</dependencyManagement>");
}

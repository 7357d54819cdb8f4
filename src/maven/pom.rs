use crate::fs::FileSystem;
use roxmltree::{Document, Node};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PomError {
    #[error("Failed to read {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Root element is <{0}>, expected <project>")]
    NotAProject(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentRef {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    /// `None` when the element is absent, `Some("")` when it is empty
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PomProperty {
    pub name: String,
    pub value: String,
    #[serde(skip)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PomDependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub scope: Option<String>,
    #[serde(skip)]
    pub source: String,
}

impl PomDependency {
    /// `groupId:artifactId`, the form starter patterns are written in
    pub fn coordinates(&self) -> String {
        format!(
            "{}:{}",
            self.group_id.as_deref().unwrap_or_default(),
            self.artifact_id.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PomPlugin {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    #[serde(skip)]
    pub source: String,
}

/// The parts of a `pom.xml` the pipeline looks at.
///
/// `source` fields keep the raw XML of each block so votes can search the
/// same text a reader would see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PomDocument {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub description: Option<String>,
    pub parent: Option<ParentRef>,
    pub modules: Vec<String>,
    pub properties: Vec<PomProperty>,
    pub dependencies: Vec<PomDependency>,
    pub plugins: Vec<PomPlugin>,
}

impl PomDocument {
    pub fn parse(content: &str) -> Result<Self, PomError> {
        let doc = Document::parse(content)?;
        let root = doc.root_element();
        if !root.has_tag_name("project") {
            return Err(PomError::NotAProject(root.tag_name().name().to_string()));
        }

        let mut pom = PomDocument {
            group_id: child_text(root, "groupId"),
            artifact_id: child_text(root, "artifactId"),
            name: child_text(root, "name"),
            version: child_text(root, "version"),
            packaging: child_text(root, "packaging"),
            description: child_text(root, "description"),
            ..Default::default()
        };

        if let Some(parent) = child(root, "parent") {
            pom.parent = Some(ParentRef {
                group_id: child_text(parent, "groupId"),
                artifact_id: child_text(parent, "artifactId"),
                version: child_text(parent, "version"),
                relative_path: child_text(parent, "relativePath"),
            });
        }

        if let Some(modules) = child(root, "modules") {
            pom.modules = elements(modules, "module")
                .map(text_of)
                .filter(|m| !m.is_empty())
                .collect();
        }

        if let Some(properties) = child(root, "properties") {
            pom.properties = properties
                .children()
                .filter(Node::is_element)
                .map(|p| PomProperty {
                    name: p.tag_name().name().to_string(),
                    value: text_of(p),
                    source: raw(p),
                })
                .collect();
        }

        if let Some(deps) = child(root, "dependencies") {
            pom.dependencies = elements(deps, "dependency")
                .map(|d| PomDependency {
                    group_id: child_text(d, "groupId"),
                    artifact_id: child_text(d, "artifactId"),
                    version: child_text(d, "version"),
                    scope: child_text(d, "scope"),
                    source: raw(d),
                })
                .collect();
        }

        if let Some(plugins) = child(root, "build").and_then(|b| child(b, "plugins")) {
            pom.plugins = elements(plugins, "plugin")
                .map(|p| PomPlugin {
                    group_id: child_text(p, "groupId"),
                    artifact_id: child_text(p, "artifactId"),
                    version: child_text(p, "version"),
                    source: raw(p),
                })
                .collect();
        }

        Ok(pom)
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, PomError> {
        let content = fs.read_to_string(path).map_err(|e| PomError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Java level from the compiler plugin properties: source, then release
    pub fn compiler_java_version(&self) -> Option<&str> {
        self.property("maven.compiler.source")
            .or_else(|| self.property("maven.compiler.release"))
    }

    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.version.as_deref()))
    }

    /// File name `mvn package` leaves under `target/`.
    ///
    /// Any `<packaging>` element, even `jar`, yields a `.war` name.
    pub fn generated_app_file(&self) -> Option<String> {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.artifact_id.as_deref())?;
        let version = self.effective_version()?;
        let extension = if self.packaging.is_some() { "war" } else { "jar" };
        Some(format!("{}-{}.{}", name, version, extension))
    }

    pub fn has_dependency_artifact(&self, artifact_id: &str) -> bool {
        self.dependencies
            .iter()
            .any(|d| d.artifact_id.as_deref() == Some(artifact_id))
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| c.has_tag_name(tag))
}

fn raw(node: Node) -> String {
    node.document().input_text()[node.range()].to_string()
}

fn text_of(node: Node) -> String {
    node.text().unwrap_or_default().trim().to_string()
}

fn child_text(node: Node, tag: &str) -> Option<String> {
    child(node, tag).map(text_of)
}

//! The unmediated dependency tree.
//!
//! Mediation keeps one entry per artifact, but for diagnostics it helps to see every
//! edge that was considered. [`DependencyNode`] records each occurrence as it was
//! reached, including the ones that lost mediation. Losing occurrences are leaves: their
//! own dependencies were never expanded.

use crate::model::Dependency;
use serde::Serialize;
use std::fmt::Write as _;

/// What mediation decided for one occurrence of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeStatus {
    /// This occurrence is the one in the resolved list.
    Selected,
    /// The same version was already selected elsewhere.
    Duplicate,
    /// A nearer occurrence selected a different version.
    Conflict { selected: String },
}

/// One occurrence of a dependency in the raw tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    pub dependency: Dependency,
    /// Version text as requested, when it differs from the resolved version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<String>,
    #[serde(flatten)]
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    #[must_use]
    pub const fn new(dependency: Dependency, status: NodeStatus) -> Self {
        Self {
            dependency,
            requested: None,
            status,
            children: Vec::new(),
        }
    }

    /// Whether this occurrence lost mediation.
    #[must_use]
    pub fn is_omitted(&self) -> bool {
        self.status != NodeStatus::Selected
    }

    /// Visit this node and its descendants depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DependencyNode, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a DependencyNode, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }

    /// Single-line label used by [`render_tree`].
    #[must_use]
    pub fn label(&self) -> String {
        let mut label = self.dependency.to_string();
        if let Some(requested) = &self.requested {
            let _ = write!(label, " (requested {requested})");
        }
        match &self.status {
            NodeStatus::Selected => {}
            NodeStatus::Duplicate => label.push_str(" (omitted for duplicate)"),
            NodeStatus::Conflict { selected } => {
                let _ = write!(label, " (omitted for conflict with {selected})");
            }
        }
        label
    }
}

/// Render root trees in the familiar `├──`/`└──` layout.
#[must_use]
pub fn render_tree(roots: &[DependencyNode]) -> String {
    let mut out = String::new();
    for root in roots {
        out.push_str(&root.label());
        out.push('\n');
        render_children(&root.children, "", &mut out);
    }
    out
}

fn render_children(children: &[DependencyNode], prefix: &str, out: &mut String) {
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        let _ = writeln!(out, "{prefix}{branch}{}", child.label());
        render_children(&child.children, &format!("{prefix}{indent}"), out);
    }
}

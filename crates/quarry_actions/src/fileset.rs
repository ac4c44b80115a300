use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::exec_path::ExecPath;

/// One symlink of a fileset: a link name relative to the fileset's exec
/// path, pointing at `target`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilesetLink {
    pub name: ExecPath,
    pub target: String,
}

impl FilesetLink {
    pub fn new(name: impl Into<ExecPath>, target: impl Into<String>) -> Self {
        FilesetLink {
            name: name.into(),
            target: target.into(),
        }
    }

    /// A link is relative when its target does not name an exec-root
    /// absolute location.
    pub fn is_relative(&self) -> bool {
        !self.target.starts_with('/')
    }
}

/// How to treat links whose target is a relative path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelativeSymlinkPolicy {
    /// Drop relative links without raising an error.
    Ignore,
}

/// Ordered set of manifest locations, one per retained link, keyed below
/// the fileset's origin exec path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesetManifest {
    entries: Vec<ExecPath>,
}

impl FilesetManifest {
    /// Builds the manifest. Entry order follows link order; a repeated link
    /// name keeps its first position.
    pub fn construct(
        links: &[FilesetLink],
        origin: &ExecPath,
        policy: RelativeSymlinkPolicy,
    ) -> FilesetManifest {
        let mut seen = HashSet::with_capacity(links.len());
        let mut entries = Vec::with_capacity(links.len());
        for link in links {
            match policy {
                RelativeSymlinkPolicy::Ignore => {
                    if link.is_relative() {
                        continue;
                    }
                }
            }
            let location = origin.join(link.name.as_str());
            if seen.insert(location.clone()) {
                entries.push(location);
            }
        }
        FilesetManifest { entries }
    }

    pub fn entries(&self) -> &[ExecPath] {
        &self.entries
    }
}

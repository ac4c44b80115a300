use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical in-build path of a file, as it appears on a command line.
///
/// Segments are `/`-separated. An exec path never ends with a slash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ExecPath(pub String);

impl ExecPath {
    pub fn new(path: impl Into<String>) -> Self {
        ExecPath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Appends a relative path below this one.
    pub fn join(&self, relative: &str) -> ExecPath {
        if self.0.is_empty() {
            return ExecPath(relative.to_string());
        }
        ExecPath(format!("{}/{}", self.0.trim_end_matches('/'), relative))
    }

    pub fn parent(&self) -> Option<ExecPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| ExecPath(parent.to_string()))
    }

    pub fn base_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ExecPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExecPath {
    fn from(path: &str) -> Self {
        ExecPath(path.to_string())
    }
}

impl From<String> for ExecPath {
    fn from(path: String) -> Self {
        ExecPath(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_and_parent() {
        let base = ExecPath::from("out/pkg");
        assert_eq!(base.join("lib.a"), ExecPath::from("out/pkg/lib.a"));
        assert_eq!(base.parent(), Some(ExecPath::from("out")));
        assert_eq!(ExecPath::from("lib.a").parent(), None);
    }

    #[test]
    fn base_name_is_last_segment() {
        assert_eq!(ExecPath::from("out/pkg/lib.a").base_name(), "lib.a");
        assert_eq!(ExecPath::from("lib.a").base_name(), "lib.a");
    }
}

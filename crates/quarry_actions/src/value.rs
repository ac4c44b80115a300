//! Heterogeneous command-line values.
//!
//! A value is either a plain string, a scalar, a file-like handle, or an
//! opaque runtime value whose string form is delegated to the host. The file
//! object model itself lives with the host; this crate only consumes the
//! capability surface below.

use std::fmt;
use std::sync::Arc;

use crate::exec_path::ExecPath;

/// Host coercion for opaque runtime values.
pub trait CommandItem: fmt::Debug + Send + Sync {
    /// Renders the value the way it appears on a command line.
    fn expand_to_command_line(&self) -> String;
}

/// Capability surface of a file-like handle: a plain file, a tree artifact
/// (directory of outputs), or a fileset (symlink tree manifest).
pub trait FileValue: fmt::Debug + Send + Sync {
    fn exec_path(&self) -> ExecPath;

    /// Label of the rule that owns this file, if any.
    fn owner_label(&self) -> Option<String> {
        None
    }

    fn is_directory(&self) -> bool {
        false
    }

    fn is_tree_artifact(&self) -> bool {
        false
    }

    fn is_fileset(&self) -> bool {
        false
    }

    fn is_source_artifact(&self) -> bool {
        false
    }

    /// True only for output-tree files whose exec path is subject to
    /// remapping. Source files and synthesized entries report false.
    fn is_derived(&self) -> bool {
        false
    }
}

/// A single command-line value.
#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    Int(i64),
    File(Arc<dyn FileValue>),
    Opaque(Arc<dyn CommandItem>),
}

impl Value {
    /// Renders the value without path remapping: strings pass through,
    /// scalars stringify, files render their exec path, opaque values defer
    /// to the host coercion.
    pub fn expand_to_command_line(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::File(f) => f.exec_path().into_string(),
            Value::Opaque(item) => item.expand_to_command_line(),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Value::File(f) if f.is_directory())
    }

    pub fn as_file(&self) -> Option<&Arc<dyn FileValue>> {
        match self {
            Value::File(f) => Some(f),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Arc<dyn FileValue>> for Value {
    fn from(file: Arc<dyn FileValue>) -> Self {
        Value::File(file)
    }
}

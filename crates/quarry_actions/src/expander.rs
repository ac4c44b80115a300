use std::fmt;

use crate::fileset::FilesetLink;
use crate::value::{FileValue, Value};

/// Raised when a fileset's symlink manifest was not registered with the
/// expander, typically because the fileset is not an input of the action.
#[derive(Debug)]
pub struct MissingExpansion {
    pub artifact: String,
}

impl fmt::Display for MissingExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing expansion for {}", self.artifact)
    }
}

impl std::error::Error for MissingExpansion {}

/// Execution-time oracle that materialises tree artifacts and filesets into
/// concrete file lists. Absent at analysis time.
pub trait Expander: Send + Sync {
    /// Appends the files contained in `tree`, in the expander's order.
    fn expand_tree(&self, tree: &dyn FileValue, out: &mut Vec<Value>);

    /// Returns the symlink manifest entries of `fileset`.
    fn fileset_links(&self, fileset: &dyn FileValue) -> Result<Vec<FilesetLink>, MissingExpansion>;
}

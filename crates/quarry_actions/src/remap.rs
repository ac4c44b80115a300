use crate::exec_path::ExecPath;

/// Output-path-mapping policy. A remapper is a pure function over exec
/// paths; it must not depend on anything outside the enclosing action's
/// inputs.
pub trait PathRemapper: Send + Sync {
    fn map(&self, path: &ExecPath) -> ExecPath;

    /// Post-processing pass over a fully expanded argument vector.
    fn map_custom_args(&self, args: Vec<String>) -> Vec<String> {
        args
    }
}

/// The distinguished identity remapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRemapper;

impl PathRemapper for NoopRemapper {
    fn map(&self, path: &ExecPath) -> ExecPath {
        path.clone()
    }
}

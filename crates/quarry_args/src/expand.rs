//! Replacement of tree-artifact and fileset values with their contained
//! files.

use std::sync::Arc;

use quarry_actions::{
    ExecPath, Expander, ExpansionError, FilesetManifest, FileValue, PathRemapper,
    RelativeSymlinkPolicy, Value,
};

/// Expands directory values when requested and possible.
///
/// Expansion requires an execution-time expander; without one the input list
/// is returned unchanged, as it is when no value is a directory.
pub(crate) fn maybe_expand_directories(
    expand_requested: bool,
    expander: Option<&Arc<dyn Expander>>,
    values: Vec<Value>,
    remapper: &dyn PathRemapper,
) -> Result<Vec<Value>, ExpansionError> {
    let expander = match expander {
        Some(expander) if expand_requested => expander,
        _ => return Ok(values),
    };
    if !values.iter().any(Value::is_directory) {
        return Ok(values);
    }
    expand_directories(expander, &values, remapper)
}

pub(crate) fn expand_directories(
    expander: &Arc<dyn Expander>,
    values: &[Value],
    remapper: &dyn PathRemapper,
) -> Result<Vec<Value>, ExpansionError> {
    let mut expanded = Vec::with_capacity(values.len());
    for value in values {
        match value.as_file() {
            Some(file) if file.is_directory() => {
                if file.is_tree_artifact() {
                    expander.expand_tree(file.as_ref(), &mut expanded);
                } else if file.is_fileset() {
                    expand_fileset(expander, file, &mut expanded, remapper)?;
                } else {
                    panic!("unknown directory artifact kind: {}", file.exec_path());
                }
            }
            _ => expanded.push(value.clone()),
        }
    }
    Ok(expanded)
}

fn expand_fileset(
    expander: &Arc<dyn Expander>,
    fileset: &Arc<dyn FileValue>,
    expanded: &mut Vec<Value>,
    remapper: &dyn PathRemapper,
) -> Result<(), ExpansionError> {
    let links = expander.fileset_links(fileset.as_ref()).map_err(|_| {
        ExpansionError::expansion(format!(
            "Could not expand fileset: {}. Did you forget to add it as an input of the action?",
            fileset.exec_path()
        ))
    })?;
    let manifest = FilesetManifest::construct(
        &links,
        &fileset.exec_path(),
        RelativeSymlinkPolicy::Ignore,
    );
    for location in manifest.entries() {
        let exec_path = remapper.map(location);
        expanded.push(Value::File(Arc::new(FilesetSymlinkFile {
            fileset: fileset.clone(),
            exec_path,
        })));
    }
    Ok(())
}

/// File synthesized from one fileset symlink, so that map-each callables
/// still see a file-shaped value after expansion. Its exec path was already
/// remapped at synthesis, so it is never remapped again.
#[derive(Debug)]
pub(crate) struct FilesetSymlinkFile {
    fileset: Arc<dyn FileValue>,
    exec_path: ExecPath,
}

impl FileValue for FilesetSymlinkFile {
    fn exec_path(&self) -> ExecPath {
        self.exec_path.clone()
    }

    fn owner_label(&self) -> Option<String> {
        self.fileset.owner_label()
    }

    // The symlinks always live in the output tree, but whether the link
    // target was a source file is lost here; settle for "not a source".
    fn is_source_artifact(&self) -> bool {
        false
    }
}

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use quarry_actions::{
    ExecPath, Expander, ExpansionError, FilesetLink, FileValue, LazySet, MissingExpansion,
    PathRemapper, Value,
};
use quarry_args::{
    Callable, CallContext, Location, ScriptArg, ScriptError, ScriptValue,
};

pub fn loc() -> Location {
    Location::new("pkg/rules.qy", 12, 4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Output,
    Tree,
    Fileset,
    /// A directory that is neither a tree artifact nor a fileset; the
    /// expander must never see one.
    OtherDirectory,
}

#[derive(Debug)]
pub struct TestFile {
    pub path: ExecPath,
    pub kind: FileKind,
    pub owner: Option<String>,
}

impl FileValue for TestFile {
    fn exec_path(&self) -> ExecPath {
        self.path.clone()
    }

    fn owner_label(&self) -> Option<String> {
        self.owner.clone()
    }

    fn is_directory(&self) -> bool {
        matches!(
            self.kind,
            FileKind::Tree | FileKind::Fileset | FileKind::OtherDirectory
        )
    }

    fn is_tree_artifact(&self) -> bool {
        self.kind == FileKind::Tree
    }

    fn is_fileset(&self) -> bool {
        self.kind == FileKind::Fileset
    }

    fn is_source_artifact(&self) -> bool {
        self.kind == FileKind::Source
    }

    fn is_derived(&self) -> bool {
        matches!(self.kind, FileKind::Output | FileKind::Tree | FileKind::Fileset)
    }
}

pub fn file(kind: FileKind, path: &str) -> Value {
    Value::File(Arc::new(TestFile {
        path: ExecPath::from(path),
        kind,
        owner: None,
    }))
}

pub fn source(path: &str) -> Value {
    file(FileKind::Source, path)
}

pub fn out(path: &str) -> Value {
    file(FileKind::Output, path)
}

pub fn tree(path: &str) -> Value {
    file(FileKind::Tree, path)
}

pub fn fileset(path: &str) -> Value {
    file(FileKind::Fileset, path)
}

/// Expander backed by registered tree contents and fileset manifests.
#[derive(Default)]
pub struct TestExpander {
    trees: BTreeMap<String, Vec<Value>>,
    filesets: BTreeMap<String, Vec<FilesetLink>>,
}

impl TestExpander {
    pub fn with_tree(mut self, path: &str, files: Vec<Value>) -> Self {
        self.trees.insert(path.to_string(), files);
        self
    }

    pub fn with_fileset(mut self, path: &str, links: Vec<FilesetLink>) -> Self {
        self.filesets.insert(path.to_string(), links);
        self
    }

    pub fn into_arc(self) -> Arc<dyn Expander> {
        Arc::new(self)
    }
}

impl Expander for TestExpander {
    fn expand_tree(&self, tree: &dyn FileValue, out: &mut Vec<Value>) {
        if let Some(files) = self.trees.get(tree.exec_path().as_str()) {
            out.extend(files.iter().cloned());
        }
    }

    fn fileset_links(&self, fileset: &dyn FileValue) -> Result<Vec<FilesetLink>, MissingExpansion> {
        self.filesets
            .get(fileset.exec_path().as_str())
            .cloned()
            .ok_or_else(|| MissingExpansion {
                artifact: fileset.exec_path().into_string(),
            })
    }
}

/// Eagerly flattened set.
pub struct ListSet(pub Vec<Value>);

impl LazySet for ListSet {
    fn to_vec(&self) -> Result<Vec<Value>, ExpansionError> {
        Ok(self.0.clone())
    }
}

/// Set whose flattening is cancelled by upstream computation.
pub struct InterruptedSet;

impl LazySet for InterruptedSet {
    fn to_vec(&self) -> Result<Vec<Value>, ExpansionError> {
        Err(ExpansionError::Interrupted)
    }
}

/// Remapper that rewrites one exec-path prefix.
pub struct SwapPrefixRemapper {
    pub from: &'static str,
    pub to: &'static str,
}

impl PathRemapper for SwapPrefixRemapper {
    fn map(&self, path: &ExecPath) -> ExecPath {
        match path.as_str().strip_prefix(self.from) {
            Some(rest) => ExecPath::from(format!("{}{}", self.to, rest)),
            None => path.clone(),
        }
    }
}

/// Identity remapper whose post-processing hook appends a sentinel token.
pub struct SentinelRemapper;

impl PathRemapper for SentinelRemapper {
    fn map(&self, path: &ExecPath) -> ExecPath {
        path.clone()
    }

    fn map_custom_args(&self, mut args: Vec<String>) -> Vec<String> {
        args.push("--post-processed".to_string());
        args
    }
}

fn arg_value(args: &[ScriptArg]) -> &Value {
    match &args[0] {
        ScriptArg::Value(value) => value,
        ScriptArg::Expander(_) => panic!("first argument must be the value"),
    }
}

fn arg_expander(args: &[ScriptArg]) -> &quarry_args::DirectoryExpander {
    match &args[1] {
        ScriptArg::Expander(expander) => expander,
        ScriptArg::Value(_) => panic!("second argument must be the expander"),
    }
}

/// One-parameter callable appending a suffix to each value's string form.
pub struct SuffixMapEach(pub &'static str);

impl Callable for SuffixMapEach {
    fn call(
        &self,
        _context: &mut CallContext,
        args: &[ScriptArg],
        _kwargs: &BTreeMap<String, Value>,
    ) -> Result<ScriptValue, ScriptError> {
        let value = arg_value(args);
        Ok(ScriptValue::Str(format!(
            "{}{}",
            value.expand_to_command_line(),
            self.0
        )))
    }

    fn param_count(&self) -> usize {
        1
    }
}

/// Two-parameter callable returning the exec paths of `expander.list(value)`.
pub struct ListViaExpander;

impl Callable for ListViaExpander {
    fn call(
        &self,
        _context: &mut CallContext,
        args: &[ScriptArg],
        _kwargs: &BTreeMap<String, Value>,
    ) -> Result<ScriptValue, ScriptError> {
        let value = arg_value(args);
        let expander = arg_expander(args);
        let items = expander
            .list(value)
            .iter()
            .map(|file| ScriptValue::Str(file.expand_to_command_line()))
            .collect();
        Ok(ScriptValue::List(items))
    }

    fn param_count(&self) -> usize {
        2
    }
}

/// One-parameter callable recording every value it is handed.
#[derive(Default)]
pub struct RecordingMapEach {
    pub seen: Mutex<Vec<String>>,
}

impl Callable for RecordingMapEach {
    fn call(
        &self,
        _context: &mut CallContext,
        args: &[ScriptArg],
        _kwargs: &BTreeMap<String, Value>,
    ) -> Result<ScriptValue, ScriptError> {
        let rendered = arg_value(args).expand_to_command_line();
        self.seen
            .lock()
            .expect("recording lock poisoned")
            .push(rendered.clone());
        Ok(ScriptValue::Str(rendered))
    }

    fn param_count(&self) -> usize {
        1
    }
}

/// Callable returning a fixed script value regardless of input.
pub struct ConstMapEach(pub fn() -> ScriptValue);

impl Callable for ConstMapEach {
    fn call(
        &self,
        _context: &mut CallContext,
        _args: &[ScriptArg],
        _kwargs: &BTreeMap<String, Value>,
    ) -> Result<ScriptValue, ScriptError> {
        Ok((self.0)())
    }

    fn param_count(&self) -> usize {
        1
    }
}

/// Callable failing with a fixed runtime evaluation error.
pub struct FailingMapEach {
    pub message_with_stack: &'static str,
    pub cause: Option<&'static str>,
}

impl Callable for FailingMapEach {
    fn call(
        &self,
        _context: &mut CallContext,
        _args: &[ScriptArg],
        _kwargs: &BTreeMap<String, Value>,
    ) -> Result<ScriptValue, ScriptError> {
        Err(ScriptError::Eval {
            message_with_stack: self.message_with_stack.to_string(),
            cause: self.cause.map(str::to_string),
        })
    }

    fn param_count(&self) -> usize {
        1
    }
}

/// Callable interrupted mid-evaluation.
pub struct InterruptedMapEach;

impl Callable for InterruptedMapEach {
    fn call(
        &self,
        _context: &mut CallContext,
        _args: &[ScriptArg],
        _kwargs: &BTreeMap<String, Value>,
    ) -> Result<ScriptValue, ScriptError> {
        Err(ScriptError::Interrupted)
    }

    fn param_count(&self) -> usize {
        1
    }
}

//! Contracts of the embedded scripting runtime, as consumed by the builder.
//!
//! Rule code hands the builder opaque callables for per-element
//! transformation. The runtime itself lives with the host; this module pins
//! down the invocation surface: argument and return value shapes, the
//! per-invocation call context, and the directory-expander handle a
//! two-parameter callable receives.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use quarry_actions::{Expander, Value};

/// Source location of the rule code that created a directive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line: Some(line),
            col: Some(col),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
            if let Some(col) = self.col {
                write!(f, ":{}", col)?;
            }
        }
        Ok(())
    }
}

/// Host scripting options, shared by every call made on behalf of one
/// command line. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Semantics {
    options: Arc<BTreeMap<String, serde_json::Value>>,
}

impl Semantics {
    pub fn new(options: BTreeMap<String, serde_json::Value>) -> Self {
        Semantics {
            options: Arc::new(options),
        }
    }

    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }
}

/// Scripting-call context scoped to a single map-each invocation. Script
/// print output is discarded.
pub struct CallContext {
    semantics: Semantics,
}

impl CallContext {
    pub fn new(semantics: Semantics) -> Self {
        CallContext { semantics }
    }

    pub fn semantics(&self) -> &Semantics {
        &self.semantics
    }

    pub fn print(&mut self, _message: &str) {}
}

/// Handle passed as the optional second argument of a map-each callable.
///
/// The full form lists a tree artifact's contained files through the
/// execution-time expander. For any non-tree file, and always in the
/// analysis-time noop form, `list(v)` returns `[v]`.
#[derive(Clone)]
pub struct DirectoryExpander {
    expander: Option<Arc<dyn Expander>>,
}

impl DirectoryExpander {
    pub fn full(expander: Arc<dyn Expander>) -> Self {
        DirectoryExpander {
            expander: Some(expander),
        }
    }

    pub fn noop() -> Self {
        DirectoryExpander { expander: None }
    }

    pub fn list(&self, value: &Value) -> Vec<Value> {
        if let (Some(expander), Value::File(file)) = (&self.expander, value) {
            if file.is_tree_artifact() {
                let mut out = Vec::new();
                expander.expand_tree(file.as_ref(), &mut out);
                return out;
            }
        }
        vec![value.clone()]
    }
}

impl fmt::Debug for DirectoryExpander {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryExpander")
            .field("full", &self.expander.is_some())
            .finish()
    }
}

/// Positional argument handed to a callable.
#[derive(Debug, Clone)]
pub enum ScriptArg {
    Value(Value),
    Expander(DirectoryExpander),
}

/// Value returned by a callable.
#[derive(Debug, Clone)]
pub enum ScriptValue {
    Str(String),
    List(Vec<ScriptValue>),
    None,
    /// Anything else the runtime can produce, carrying its type name.
    Other(&'static str),
}

impl ScriptValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Str(_) => "string",
            ScriptValue::List(_) => "list",
            ScriptValue::None => "NoneType",
            ScriptValue::Other(name) => name,
        }
    }
}

/// Failure raised by the scripting runtime while evaluating a callable.
#[derive(Debug)]
pub enum ScriptError {
    Eval {
        /// Error text including the script stack trace.
        message_with_stack: String,
        cause: Option<String>,
    },
    Interrupted,
}

/// A callable supplied by rule code. Map-each invocations never pass
/// keyword arguments; the map is part of the general runtime contract.
pub trait Callable: Send + Sync {
    fn call(
        &self,
        context: &mut CallContext,
        args: &[ScriptArg],
        kwargs: &BTreeMap<String, Value>,
    ) -> Result<ScriptValue, ScriptError>;

    /// Number of parameters the callable declares. A count of two or more
    /// means it wants the directory-expander handle.
    fn param_count(&self) -> usize;
}

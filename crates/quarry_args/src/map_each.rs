//! Per-element invocation of a rule-supplied callable.

use std::collections::BTreeMap;
use std::sync::Arc;

use quarry_actions::{Expander, ExpansionError, Value};

use crate::script::{
    Callable, CallContext, DirectoryExpander, Location, ScriptArg, ScriptError, ScriptValue,
    Semantics,
};

/// Calls `map_fn` once per value, forwarding the produced strings to `sink`.
///
/// A callable declaring two or more parameters receives a directory-expander
/// handle as its second argument: the full form when an execution-time
/// expander is present, the noop form otherwise. Accepted returns are a
/// string, a list of strings, or none (skipped); anything else fails the
/// expansion. Runtime evaluation errors are wrapped with the rule source
/// location; interruption propagates unchanged.
pub(crate) fn apply_map_each(
    map_fn: &Arc<dyn Callable>,
    values: &[Value],
    sink: &mut dyn FnMut(String),
    location: &Location,
    expander: Option<&Arc<dyn Expander>>,
    semantics: &Semantics,
) -> Result<(), ExpansionError> {
    let mut context = CallContext::new(semantics.clone());
    let wants_expander = map_fn.param_count() >= 2;
    let directory_expander = if wants_expander {
        Some(match expander {
            Some(expander) => DirectoryExpander::full(expander.clone()),
            None => DirectoryExpander::noop(),
        })
    } else {
        None
    };
    let kwargs = BTreeMap::new();
    for value in values {
        let mut args = Vec::with_capacity(2);
        args.push(ScriptArg::Value(value.clone()));
        if let Some(directory_expander) = &directory_expander {
            args.push(ScriptArg::Expander(directory_expander.clone()));
        }
        let ret = map_fn
            .call(&mut context, &args, &kwargs)
            .map_err(|err| wrap_script_error(err, location))?;
        match ret {
            ScriptValue::Str(s) => sink(s),
            ScriptValue::List(items) => {
                for item in items {
                    match item {
                        ScriptValue::Str(s) => sink(s),
                        other => {
                            return Err(ExpansionError::expansion(format!(
                                "Expected map_each to return string, None, or list of strings, \
                                 found list containing {}",
                                other.type_name()
                            )));
                        }
                    }
                }
            }
            ScriptValue::None => {}
            other => {
                return Err(ExpansionError::expansion(format!(
                    "Expected map_each to return string, None, or list of strings, found {}",
                    other.type_name()
                )));
            }
        }
    }
    Ok(())
}

fn wrap_script_error(err: ScriptError, location: &Location) -> ExpansionError {
    match err {
        ScriptError::Eval {
            message_with_stack,
            cause,
        } => ExpansionError::Expansion(error_message(&message_with_stack, location, cause)),
        ScriptError::Interrupted => ExpansionError::Interrupted,
    }
}

fn error_message(message: &str, location: &Location, cause: Option<String>) -> String {
    let mut out = format!("\n{}: {}", location, message);
    if let Some(cause) = cause {
        // Skip the cause if it is redundant with the message so far.
        if !cause.is_empty() && !message.contains(&cause) {
            out.push('\n');
            out.push_str(&cause);
        }
    }
    out
}

//! Nested-set fingerprint facade.
//!
//! Hosts typically back `ActionKeyContext` with a per-build memo of set
//! digests keyed by `(set identity, MapFnKey)`. The trait's default methods
//! are the cache-free reference behavior; `DirectKeyContext` exposes them
//! as-is for tests and simple hosts.

use std::sync::Arc;

use crate::error::ExpansionError;
use crate::fingerprint::Fingerprint;
use crate::set::LazySet;
use crate::value::Value;

/// Cache-key identity of a parameterized per-item map function.
///
/// Two map functions are interchangeable for caching iff they wrap the same
/// callable by identity and agree on whether an artifact expander was
/// attached. The expander instance itself never participates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapFnKey {
    pub callable_identity: usize,
    pub has_expander: bool,
}

/// Per-item string expansion used while folding a set into a fingerprint.
pub trait ItemMapFn: Send + Sync {
    fn expand_item(
        &self,
        value: &Value,
        sink: &mut dyn FnMut(String),
    ) -> Result<(), ExpansionError>;

    fn cache_key(&self) -> MapFnKey;
}

pub trait ActionKeyContext {
    /// Folds each set element's command-line string into the sink.
    fn add_set_to_fingerprint(
        &self,
        fingerprint: &mut Fingerprint,
        set: &Arc<dyn LazySet>,
    ) -> Result<(), ExpansionError> {
        for value in set.to_vec()? {
            fingerprint.add_str(&value.expand_to_command_line());
        }
        Ok(())
    }

    /// Folds each set element through `map_fn` into the sink.
    fn add_set_to_fingerprint_mapped(
        &self,
        map_fn: &dyn ItemMapFn,
        fingerprint: &mut Fingerprint,
        set: &Arc<dyn LazySet>,
    ) -> Result<(), ExpansionError> {
        for value in set.to_vec()? {
            map_fn.expand_item(&value, &mut |s| {
                fingerprint.add_str(&s);
            })?;
        }
        Ok(())
    }
}

/// Cache-free key context.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectKeyContext;

impl ActionKeyContext for DirectKeyContext {}

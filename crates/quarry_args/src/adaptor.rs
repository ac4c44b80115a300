//! Map-each adaptor used as a nested-set fingerprint cache key.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use quarry_actions::{
    Expander, ExpansionError, ItemMapFn, MapFnKey, NoopRemapper, Value,
};

use crate::expand::expand_directories;
use crate::map_each::apply_map_each;
use crate::script::{Callable, Location, Semantics};

/// Wraps one callable for the nested-set fingerprint cache.
///
/// Equality and hashing depend only on the callable's identity and on
/// whether an expander was attached at construction. The expander field is
/// cleared right after the fingerprint call so the adaptor, which the cache
/// keeps as a key, does not prolong the expander's lifetime; the cache is
/// emptied after every build, so within its lifetime an attached expander
/// for a given action can only have been the same instance. Expanding items
/// after the clear is a caller bug and fails loudly.
pub struct MapEachAdaptor {
    map_fn: Arc<dyn Callable>,
    location: Location,
    semantics: Semantics,
    has_expander: bool,
    expander: Mutex<Option<Arc<dyn Expander>>>,
}

impl std::fmt::Debug for MapEachAdaptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapEachAdaptor")
            .field("location", &self.location)
            .field("semantics", &self.semantics)
            .field("has_expander", &self.has_expander)
            .finish()
    }
}

impl MapEachAdaptor {
    pub(crate) fn new(
        map_fn: Arc<dyn Callable>,
        location: Location,
        semantics: Semantics,
        expander: Option<Arc<dyn Expander>>,
    ) -> Self {
        MapEachAdaptor {
            map_fn,
            location,
            semantics,
            has_expander: expander.is_some(),
            expander: Mutex::new(expander),
        }
    }

    /// Drops the expander reference. Does not affect equality or hashing.
    pub(crate) fn clear_expander(&self) {
        *self.expander.lock().expect("adaptor expander lock poisoned") = None;
    }

    fn expander(&self) -> Option<Arc<dyn Expander>> {
        self.expander
            .lock()
            .expect("adaptor expander lock poisoned")
            .clone()
    }
}

impl ItemMapFn for MapEachAdaptor {
    fn expand_item(
        &self,
        value: &Value,
        sink: &mut dyn FnMut(String),
    ) -> Result<(), ExpansionError> {
        let expander = self.expander();
        assert!(
            expander.is_some() || !self.has_expander,
            "map-each adaptor used after its expander was cleared"
        );
        let values = match &expander {
            Some(expander) if value.is_directory() => {
                expand_directories(expander, std::slice::from_ref(value), &NoopRemapper)?
            }
            _ => vec![value.clone()],
        };
        apply_map_each(
            &self.map_fn,
            &values,
            sink,
            &self.location,
            expander.as_ref(),
            &self.semantics,
        )
    }

    fn cache_key(&self) -> MapFnKey {
        MapFnKey {
            callable_identity: Arc::as_ptr(&self.map_fn) as *const () as usize,
            has_expander: self.has_expander,
        }
    }
}

impl PartialEq for MapEachAdaptor {
    fn eq(&self, other: &Self) -> bool {
        self.cache_key() == other.cache_key()
    }
}

impl Eq for MapEachAdaptor {}

impl Hash for MapEachAdaptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cache_key().hash(state);
    }
}

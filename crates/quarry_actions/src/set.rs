use crate::error::ExpansionError;
use crate::value::Value;

/// A lazily flattened, deduplicating immutable set of values shared across
/// the build graph.
///
/// Flattening may block on upstream computation; cooperative cancellation
/// surfaces as `ExpansionError::Interrupted`.
pub trait LazySet: Send + Sync {
    fn to_vec(&self) -> Result<Vec<Value>, ExpansionError>;
}

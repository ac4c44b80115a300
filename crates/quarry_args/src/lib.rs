//! Deferred command-line construction for rule code.
//!
//! Rule code appends scalar, formatted, and vector arguments to a
//! [`CommandLineBuilder`]; the built command line expands to its argument
//! vector at execution time and fingerprints itself at analysis time
//! without expanding tree artifacts it does not need to.

mod adaptor;
mod coerce;
mod expand;
mod line;
mod map_each;
mod script;
mod vector;

pub use adaptor::MapEachAdaptor;
pub use line::{CommandLineBuilder, DeferredCommandLine, GroupedCommandLine};
pub use script::{
    Callable, CallContext, DirectoryExpander, Location, ScriptArg, ScriptError, ScriptValue,
    Semantics,
};
pub use vector::VectorSpec;

mod command_line;
mod error;
mod exec_path;
mod expander;
mod fileset;
mod fingerprint;
mod format;
mod key_context;
mod remap;
mod set;
mod value;

pub use command_line::{concat, empty, of, CommandLine};
pub use error::ExpansionError;
pub use exec_path::ExecPath;
pub use expander::{Expander, MissingExpansion};
pub use fileset::{FilesetLink, FilesetManifest, RelativeSymlinkPolicy};
pub use fingerprint::Fingerprint;
pub use format::format_single;
pub use key_context::{ActionKeyContext, DirectKeyContext, ItemMapFn, MapFnKey};
pub use remap::{NoopRemapper, PathRemapper};
pub use set::LazySet;
pub use value::{CommandItem, FileValue, Value};

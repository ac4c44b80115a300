//! The argument-vector abstraction actions are spawned with.

use std::sync::Arc;

use crate::error::ExpansionError;
use crate::expander::Expander;
use crate::fingerprint::Fingerprint;
use crate::key_context::ActionKeyContext;
use crate::remap::PathRemapper;

/// A deterministic representation of a list of arguments.
pub trait CommandLine: Send + Sync {
    /// Returns the command line with no expander and the identity remapper.
    fn arguments(&self) -> Result<Vec<String>, ExpansionError>;

    /// Returns the command line with enclosed directories expanded by
    /// `expander` at execution time. Implementations that carry tree
    /// artifacts or filesets must override this.
    fn arguments_with(
        &self,
        _expander: Option<&Arc<dyn Expander>>,
        _remapper: &dyn PathRemapper,
    ) -> Result<Vec<String>, ExpansionError> {
        self.arguments()
    }

    /// Adds the command line to `fingerprint`. Without an expander the key
    /// may under-distinguish command lines that differ only after directory
    /// expansion.
    fn add_to_fingerprint(
        &self,
        _key_context: &dyn ActionKeyContext,
        _expander: Option<&Arc<dyn Expander>>,
        fingerprint: &mut Fingerprint,
    ) -> Result<(), ExpansionError> {
        for arg in self.arguments()? {
            fingerprint.add_str(&arg);
        }
        Ok(())
    }
}

struct EmptyCommandLine;

impl CommandLine for EmptyCommandLine {
    fn arguments(&self) -> Result<Vec<String>, ExpansionError> {
        Ok(Vec::new())
    }
}

/// Returns the empty command line.
pub fn empty() -> Arc<dyn CommandLine> {
    Arc::new(EmptyCommandLine)
}

struct SimpleCommandLine {
    args: Vec<String>,
}

impl CommandLine for SimpleCommandLine {
    fn arguments(&self) -> Result<Vec<String>, ExpansionError> {
        Ok(self.args.clone())
    }
}

/// Returns a command line backed by the given argument list.
pub fn of(args: Vec<String>) -> Arc<dyn CommandLine> {
    if args.is_empty() {
        empty()
    } else {
        Arc::new(SimpleCommandLine { args })
    }
}

struct SuffixedCommandLine {
    base: Arc<dyn CommandLine>,
    suffix: Vec<String>,
}

impl CommandLine for SuffixedCommandLine {
    fn arguments(&self) -> Result<Vec<String>, ExpansionError> {
        let mut args = self.base.arguments()?;
        args.extend(self.suffix.iter().cloned());
        Ok(args)
    }

    fn arguments_with(
        &self,
        expander: Option<&Arc<dyn Expander>>,
        remapper: &dyn PathRemapper,
    ) -> Result<Vec<String>, ExpansionError> {
        let mut args = self.base.arguments_with(expander, remapper)?;
        args.extend(self.suffix.iter().cloned());
        Ok(args)
    }
}

/// Returns `base` with `suffix` appended.
pub fn concat(base: Arc<dyn CommandLine>, suffix: Vec<String>) -> Arc<dyn CommandLine> {
    if suffix.is_empty() {
        base
    } else {
        Arc::new(SuffixedCommandLine { base, suffix })
    }
}

use std::fmt;

/// Failure raised while expanding or fingerprinting a command line.
///
/// `Expansion` is recoverable at the action executor, which converts it into
/// a user-facing action failure. `Interrupted` reports cooperative
/// cancellation surfaced by a host callable and must be propagated unchanged.
#[derive(Debug)]
pub enum ExpansionError {
    Expansion(String),
    Interrupted,
}

impl ExpansionError {
    pub fn expansion(message: impl Into<String>) -> Self {
        ExpansionError::Expansion(message.into())
    }
}

impl fmt::Display for ExpansionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpansionError::Expansion(message) => write!(f, "{}", message),
            ExpansionError::Interrupted => write!(f, "interrupted during command line expansion"),
        }
    }
}

impl std::error::Error for ExpansionError {}

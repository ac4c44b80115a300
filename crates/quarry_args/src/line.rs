//! The instruction stream and the command-line frontends decoding it.
//!
//! A built command line is an append-only buffer of tagged slots. Most slots
//! are plain values; a vector feature word or the formatted-arg marker
//! announces a payload of the following slots. A single build can hold
//! millions of directives, so the stream stays flat instead of nesting one
//! allocation per directive.

use std::sync::Arc;

use uuid::Uuid;

use quarry_actions::format_single;
use quarry_actions::{
    ActionKeyContext, CommandLine, Expander, ExpansionError, Fingerprint, LazySet, NoopRemapper,
    PathRemapper, Value,
};

use crate::coerce::expand_value;
use crate::script::{Callable, Location, Semantics};
use crate::vector::{VectorArg, VectorSpec};

const SINGLE_FORMATTED_ARG_TAG: Uuid = Uuid::from_u128(0x8cb96642_a235_4fe0_b3ed_ebfdae8a0bd9);

/// One entry of the instruction stream.
pub(crate) enum Slot {
    Value(Value),
    Str(String),
    Count(usize),
    Callable(Arc<dyn Callable>),
    Location(Location),
    Semantics(Semantics),
    Set(Arc<dyn LazySet>),
    Vector(Arc<VectorArg>),
    /// The next two slots are a value and its format string.
    FormattedMarker,
}

impl Slot {
    fn kind(&self) -> &'static str {
        match self {
            Slot::Value(_) => "value",
            Slot::Str(_) => "string",
            Slot::Count(_) => "count",
            Slot::Callable(_) => "callable",
            Slot::Location(_) => "location",
            Slot::Semantics(_) => "semantics",
            Slot::Set(_) => "set",
            Slot::Vector(_) => "vector",
            Slot::FormattedMarker => "formatted-arg marker",
        }
    }

    pub(crate) fn expect_value(&self) -> &Value {
        match self {
            Slot::Value(value) => value,
            other => drift(other, "value"),
        }
    }

    pub(crate) fn expect_str(&self) -> &str {
        match self {
            Slot::Str(s) => s,
            other => drift(other, "string"),
        }
    }

    pub(crate) fn expect_count(&self) -> usize {
        match self {
            Slot::Count(count) => *count,
            other => drift(other, "count"),
        }
    }

    pub(crate) fn expect_callable(&self) -> &Arc<dyn Callable> {
        match self {
            Slot::Callable(map_fn) => map_fn,
            other => drift(other, "callable"),
        }
    }

    pub(crate) fn expect_location(&self) -> &Location {
        match self {
            Slot::Location(location) => location,
            other => drift(other, "location"),
        }
    }

    pub(crate) fn expect_semantics(&self) -> &Semantics {
        match self {
            Slot::Semantics(semantics) => semantics,
            other => drift(other, "semantics"),
        }
    }

    pub(crate) fn expect_set(&self) -> &Arc<dyn LazySet> {
        match self {
            Slot::Set(set) => set,
            other => drift(other, "set"),
        }
    }
}

fn drift(found: &Slot, wanted: &str) -> ! {
    panic!(
        "instruction stream corrupted: expected {} slot, found {}",
        wanted,
        found.kind()
    )
}

/// Accumulates directives for one action's argument vector.
pub struct CommandLineBuilder {
    semantics: Semantics,
    slots: Vec<Slot>,
    /// Buffer positions where logical argument groups begin, for
    /// flag-per-line assembly.
    arg_starts: Vec<usize>,
}

impl CommandLineBuilder {
    pub fn new(semantics: Semantics) -> Self {
        CommandLineBuilder {
            semantics,
            slots: Vec::new(),
            arg_starts: Vec::new(),
        }
    }

    /// Marks the start of a logical argument group.
    pub fn record_arg_start(&mut self) -> &mut Self {
        self.arg_starts.push(self.slots.len());
        self
    }

    /// Appends one scalar value.
    pub fn add(&mut self, value: impl Into<Value>) -> &mut Self {
        self.slots.push(Slot::Value(value.into()));
        self
    }

    /// Validates and serialises a vector argument.
    pub fn add_vector(&mut self, spec: VectorSpec) -> Result<&mut Self, ExpansionError> {
        VectorArg::push(&mut self.slots, spec, &self.semantics)?;
        Ok(self)
    }

    /// Appends one value rendered through a single-placeholder format.
    pub fn add_formatted(&mut self, value: impl Into<Value>, format: impl Into<String>) -> &mut Self {
        self.slots.push(Slot::FormattedMarker);
        self.slots.push(Slot::Value(value.into()));
        self.slots.push(Slot::Str(format.into()));
        self
    }

    /// Freezes the stream. With `flag_per_line`, the recorded argument
    /// groups are coalesced into one token per group at expansion time.
    pub fn build(self, flag_per_line: bool) -> Arc<dyn CommandLine> {
        if self.slots.is_empty() {
            return quarry_actions::empty();
        }
        let line = DeferredCommandLine { slots: self.slots };
        if flag_per_line {
            assert!(
                !self.arg_starts.is_empty(),
                "argument group starts were not recorded"
            );
            Arc::new(GroupedCommandLine {
                line,
                group_starts: self.arg_starts,
            })
        } else {
            Arc::new(line)
        }
    }
}

/// Command line that decodes its instruction stream on demand.
pub struct DeferredCommandLine {
    slots: Vec<Slot>,
}

impl DeferredCommandLine {
    /// Walks the stream, appending expanded tokens. When `record_starts` is
    /// given, the output length at each recorded buffer position is noted so
    /// directive expansion is reflected in the group boundaries.
    fn expand(
        &self,
        expander: Option<&Arc<dyn Expander>>,
        remapper: &dyn PathRemapper,
        record_starts: Option<&[usize]>,
    ) -> Result<(Vec<String>, Vec<usize>), ExpansionError> {
        let mut result = Vec::new();
        let mut result_starts = Vec::new();
        let mut starts = record_starts.unwrap_or_default().iter().peekable();
        let mut argi = 0;
        while argi < self.slots.len() {
            if starts.next_if(|&&start| start == argi).is_some() {
                result_starts.push(result.len());
            }
            let slot = &self.slots[argi];
            argi += 1;
            match slot {
                Slot::Vector(vector) => {
                    argi = vector.eval(&self.slots, argi, &mut result, expander, remapper)?;
                }
                Slot::FormattedMarker => {
                    let value = self.slots[argi].expect_value();
                    let format = self.slots[argi + 1].expect_str();
                    argi += 2;
                    result.push(format_single(format, &expand_value(value, remapper))?);
                }
                Slot::Value(value) => result.push(expand_value(value, remapper)),
                Slot::Str(s) => result.push(s.clone()),
                other => drift(other, "directive or value"),
            }
        }
        Ok((result, result_starts))
    }

    fn fingerprint_slots(
        &self,
        key_context: &dyn ActionKeyContext,
        expander: Option<&Arc<dyn Expander>>,
        fingerprint: &mut Fingerprint,
    ) -> Result<(), ExpansionError> {
        let mut argi = 0;
        while argi < self.slots.len() {
            let slot = &self.slots[argi];
            argi += 1;
            match slot {
                Slot::Vector(vector) => {
                    argi = vector.add_to_fingerprint(
                        &self.slots,
                        argi,
                        key_context,
                        fingerprint,
                        expander,
                    )?;
                }
                Slot::FormattedMarker => {
                    let value = self.slots[argi].expect_value();
                    let format = self.slots[argi + 1].expect_str();
                    argi += 2;
                    fingerprint.add_str(&value.expand_to_command_line());
                    fingerprint.add_str(format);
                    fingerprint.add_uuid(SINGLE_FORMATTED_ARG_TAG);
                }
                Slot::Value(value) => {
                    fingerprint.add_str(&value.expand_to_command_line());
                }
                Slot::Str(s) => {
                    fingerprint.add_str(s);
                }
                other => drift(other, "directive or value"),
            }
        }
        Ok(())
    }
}

impl CommandLine for DeferredCommandLine {
    fn arguments(&self) -> Result<Vec<String>, ExpansionError> {
        self.arguments_with(None, &NoopRemapper)
    }

    fn arguments_with(
        &self,
        expander: Option<&Arc<dyn Expander>>,
        remapper: &dyn PathRemapper,
    ) -> Result<Vec<String>, ExpansionError> {
        let (result, _) = self.expand(expander, remapper, None)?;
        Ok(remapper.map_custom_args(result))
    }

    fn add_to_fingerprint(
        &self,
        key_context: &dyn ActionKeyContext,
        expander: Option<&Arc<dyn Expander>>,
        fingerprint: &mut Fingerprint,
    ) -> Result<(), ExpansionError> {
        self.fingerprint_slots(key_context, expander, fingerprint)
    }
}

/// Flag-per-line variant: after decoding, each recorded group of two or more
/// tokens collapses into `first + "=" + rest.join(" ")`, so a group emitted
/// as `--flag v1 v2` becomes `--flag=v1 v2`. An empty first token yields
/// just the joined rest.
pub struct GroupedCommandLine {
    line: DeferredCommandLine,
    group_starts: Vec<usize>,
}

impl CommandLine for GroupedCommandLine {
    fn arguments(&self) -> Result<Vec<String>, ExpansionError> {
        self.arguments_with(None, &NoopRemapper)
    }

    fn arguments_with(
        &self,
        expander: Option<&Arc<dyn Expander>>,
        remapper: &dyn PathRemapper,
    ) -> Result<Vec<String>, ExpansionError> {
        let (result, mut starts) =
            self.line
                .expand(expander, remapper, Some(&self.group_starts))?;
        let group_count = starts.len();
        starts.push(result.len());
        let mut grouped = Vec::with_capacity(group_count);
        for i in 0..group_count {
            let group = &result[starts[i]..starts[i + 1]];
            if group.len() < 2 {
                grouped.extend(group.iter().cloned());
            } else {
                let rest = group[1..].join(" ");
                if group[0].is_empty() {
                    grouped.push(rest);
                } else {
                    grouped.push(format!("{}={}", group[0], rest));
                }
            }
        }
        Ok(grouped)
    }

    fn add_to_fingerprint(
        &self,
        key_context: &dyn ActionKeyContext,
        expander: Option<&Arc<dyn Expander>>,
        fingerprint: &mut Fingerprint,
    ) -> Result<(), ExpansionError> {
        self.line
            .fingerprint_slots(key_context, expander, fingerprint)
    }
}

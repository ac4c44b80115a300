//! Vector directives: groups of arguments derived from a list or a lazy
//! set, with optional per-element transformation, formatting, joining, and
//! de-duplication.
//!
//! A directive is one interned feature word followed by a payload whose
//! shape is fully determined by the word. The decoder consumes every slot
//! the word announces, even when `omit_if_empty` suppresses all output, so
//! cursor advancement is a pure function of the word.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock};

use uuid::Uuid;

use quarry_actions::format_single;
use quarry_actions::{
    ActionKeyContext, Expander, ExpansionError, Fingerprint, LazySet, NoopRemapper, PathRemapper,
    Value,
};

use crate::adaptor::MapEachAdaptor;
use crate::coerce::expand_value;
use crate::expand::maybe_expand_directories;
use crate::line::Slot;
use crate::map_each::apply_map_each;
use crate::script::{Callable, Location, Semantics};

const HAS_MAP_EACH: u16 = 1;
const IS_NESTED_SET: u16 = 1 << 1;
const EXPAND_DIRECTORIES: u16 = 1 << 2;
const UNIQUIFY: u16 = 1 << 3;
const OMIT_IF_EMPTY: u16 = 1 << 4;
const HAS_ARG_NAME: u16 = 1 << 5;
const HAS_FORMAT_EACH: u16 = 1 << 6;
const HAS_BEFORE_EACH: u16 = 1 << 7;
const HAS_JOIN_WITH: u16 = 1 << 8;
const HAS_FORMAT_JOINED: u16 = 1 << 9;
const HAS_TERMINATE_WITH: u16 = 1 << 10;

// Persisted action-cache keys depend on these exact values.
const EXPAND_DIRECTORIES_TAG: Uuid = Uuid::from_u128(0x9d7520d2_a187_11e8_98d0_529269fb1459);
const UNIQUIFY_TAG: Uuid = Uuid::from_u128(0x7f494c3e_faea_4498_a521_5d3bc6ee19eb);
const OMIT_IF_EMPTY_TAG: Uuid = Uuid::from_u128(0x923206f1_6474_4a8f_b30f_4dd3143622e6);
const ARG_NAME_TAG: Uuid = Uuid::from_u128(0x2bc00382_7199_46ec_ad52_1556577cde1a);
const FORMAT_EACH_TAG: Uuid = Uuid::from_u128(0x8e974aec_df07_4a51_9418_f4c1172b4045);
const BEFORE_EACH_TAG: Uuid = Uuid::from_u128(0xf7e101bc_644d_4277_8562_6515ad55a988);
const JOIN_WITH_TAG: Uuid = Uuid::from_u128(0xc227dbd3_edad_454e_bc8a_c9b5ba1c38a3);
const FORMAT_JOINED_TAG: Uuid = Uuid::from_u128(0x528af376_4233_4c27_be4d_b0ff24ed68db);
const TERMINATE_WITH_TAG: Uuid = Uuid::from_u128(0xa4e5e090_0dbd_4d41_899a_77cfbba58655);

/// Interned feature word of one vector directive. Equality and hashing
/// depend only on the word.
#[derive(Debug)]
pub(crate) struct VectorArg {
    features: u16,
}

impl PartialEq for VectorArg {
    fn eq(&self, other: &Self) -> bool {
        self.features == other.features
    }
}

impl Eq for VectorArg {}

impl std::hash::Hash for VectorArg {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.features.hash(state);
    }
}

impl VectorArg {
    /// Returns the canonical instance for `features`. The interner is
    /// process-wide and immutable after insert.
    pub(crate) fn intern(features: u16) -> Arc<VectorArg> {
        static INTERNER: OnceLock<Mutex<HashMap<u16, Arc<VectorArg>>>> = OnceLock::new();
        let interner = INTERNER.get_or_init(|| Mutex::new(HashMap::new()));
        let mut interned = interner.lock().expect("feature word interner poisoned");
        interned
            .entry(features)
            .or_insert_with(|| Arc::new(VectorArg { features }))
            .clone()
    }

    fn has(&self, bit: u16) -> bool {
        self.features & bit != 0
    }

    /// Serialises `spec` into the instruction stream.
    pub(crate) fn push(
        slots: &mut Vec<Slot>,
        spec: VectorSpec,
        semantics: &Semantics,
    ) -> Result<(), ExpansionError> {
        if spec.before_each.is_some() && spec.join_with.is_some() {
            return Err(ExpansionError::expansion(
                "before_each and join_with are mutually exclusive",
            ));
        }
        if spec.format_joined.is_some() && spec.join_with.is_none() {
            return Err(ExpansionError::expansion(
                "format_joined requires join_with",
            ));
        }
        // Only map_each consumers read the location, but it is cheap enough
        // to require unconditionally.
        let location = spec
            .location
            .expect("vector directive requires a source location");

        let mut features = 0u16;
        if spec.map_each.is_some() {
            features |= HAS_MAP_EACH;
        }
        if spec.set.is_some() {
            features |= IS_NESTED_SET;
        }
        if spec.expand_directories {
            features |= EXPAND_DIRECTORIES;
        }
        if spec.uniquify {
            features |= UNIQUIFY;
        }
        if spec.omit_if_empty {
            features |= OMIT_IF_EMPTY;
        }
        if spec.arg_name.is_some() {
            features |= HAS_ARG_NAME;
        }
        if spec.format_each.is_some() {
            features |= HAS_FORMAT_EACH;
        }
        if spec.before_each.is_some() {
            features |= HAS_BEFORE_EACH;
        }
        if spec.join_with.is_some() {
            features |= HAS_JOIN_WITH;
        }
        if spec.format_joined.is_some() {
            features |= HAS_FORMAT_JOINED;
        }
        if spec.terminate_with.is_some() {
            features |= HAS_TERMINATE_WITH;
        }
        slots.push(Slot::Vector(VectorArg::intern(features)));

        if let Some(map_fn) = spec.map_each {
            slots.push(Slot::Callable(map_fn));
            slots.push(Slot::Location(location));
            slots.push(Slot::Semantics(semantics.clone()));
        }
        if let Some(set) = spec.set {
            slots.push(Slot::Set(set));
        } else {
            let list = spec.list;
            slots.push(Slot::Count(list.len()));
            for value in list {
                slots.push(Slot::Value(value));
            }
        }
        for field in [
            spec.arg_name,
            spec.format_each,
            spec.before_each,
            spec.join_with,
            spec.format_joined,
            spec.terminate_with,
        ]
        .into_iter()
        .flatten()
        {
            slots.push(Slot::Str(field));
        }
        Ok(())
    }

    /// Evaluates the directive payload starting at `argi`, appending
    /// expanded strings to `out`. Returns the index of the next directive.
    pub(crate) fn eval(
        &self,
        slots: &[Slot],
        mut argi: usize,
        out: &mut Vec<String>,
        expander: Option<&Arc<dyn Expander>>,
        remapper: &dyn PathRemapper,
    ) -> Result<usize, ExpansionError> {
        let map_ctx = if self.has(HAS_MAP_EACH) {
            let map_fn = slots[argi].expect_callable();
            let location = slots[argi + 1].expect_location();
            let semantics = slots[argi + 2].expect_semantics();
            argi += 3;
            Some((map_fn, location, semantics))
        } else {
            None
        };

        let original_values: Vec<Value>;
        if self.has(IS_NESTED_SET) {
            let set = slots[argi].expect_set();
            argi += 1;
            original_values = set.to_vec()?;
        } else {
            let count = slots[argi].expect_count();
            argi += 1;
            original_values = slots[argi..argi + count]
                .iter()
                .map(|slot| slot.expect_value().clone())
                .collect();
            argi += count;
        }
        let expanded_values = maybe_expand_directories(
            self.has(EXPAND_DIRECTORIES),
            expander,
            original_values,
            remapper,
        )?;

        let mut strings = Vec::with_capacity(expanded_values.len());
        if let Some((map_fn, location, semantics)) = map_ctx {
            apply_map_each(
                map_fn,
                &expanded_values,
                &mut |s| strings.push(s),
                location,
                expander,
                semantics,
            )?;
        } else {
            for value in &expanded_values {
                strings.push(expand_value(value, remapper));
            }
        }

        // Uniquifying here is safe: the transformations below keep distinct
        // values distinct.
        if self.has(UNIQUIFY) {
            let mut seen = HashSet::with_capacity(strings.len());
            strings.retain(|s| seen.insert(s.clone()));
        }
        let is_empty_and_should_omit = strings.is_empty() && self.has(OMIT_IF_EMPTY);
        if self.has(HAS_ARG_NAME) {
            let arg_name = slots[argi].expect_str();
            argi += 1;
            if !is_empty_and_should_omit {
                out.push(arg_name.to_string());
            }
        }
        if self.has(HAS_FORMAT_EACH) {
            let format = slots[argi].expect_str();
            argi += 1;
            for s in strings.iter_mut() {
                *s = format_single(format, s)?;
            }
        }
        if self.has(HAS_BEFORE_EACH) {
            let before_each = slots[argi].expect_str();
            argi += 1;
            for s in strings.drain(..) {
                out.push(before_each.to_string());
                out.push(s);
            }
        } else if self.has(HAS_JOIN_WITH) {
            let join_with = slots[argi].expect_str();
            argi += 1;
            let format_joined = if self.has(HAS_FORMAT_JOINED) {
                let format = slots[argi].expect_str();
                argi += 1;
                Some(format)
            } else {
                None
            };
            if !is_empty_and_should_omit {
                let mut joined = strings.join(join_with);
                if let Some(format) = format_joined {
                    joined = format_single(format, &joined)?;
                }
                out.push(joined);
            }
        } else {
            out.append(&mut strings);
        }
        if self.has(HAS_TERMINATE_WITH) {
            let terminate_with = slots[argi].expect_str();
            argi += 1;
            if !is_empty_and_should_omit {
                out.push(terminate_with.to_string());
            }
        }
        Ok(argi)
    }

    /// Fingerprint mirror of [`eval`](Self::eval).
    ///
    /// The remapper is deliberately the identity here: a remapper is a pure
    /// function of the action's inputs, which are fingerprinted elsewhere.
    /// For list payloads at analysis time (no expander) with directory
    /// expansion requested, map_each runs over the unexpanded directory
    /// values; two command lines differing only after expansion can then
    /// produce equal digests. That is tolerated because the real expander is
    /// consulted at execution time.
    pub(crate) fn add_to_fingerprint(
        &self,
        slots: &[Slot],
        mut argi: usize,
        key_context: &dyn ActionKeyContext,
        fingerprint: &mut Fingerprint,
        expander: Option<&Arc<dyn Expander>>,
    ) -> Result<usize, ExpansionError> {
        let map_ctx = if self.has(HAS_MAP_EACH) {
            let map_fn = slots[argi].expect_callable();
            let location = slots[argi + 1].expect_location();
            let semantics = slots[argi + 2].expect_semantics();
            argi += 3;
            Some((map_fn, location, semantics))
        } else {
            None
        };

        if self.has(IS_NESTED_SET) {
            let set = slots[argi].expect_set();
            argi += 1;
            if let Some((map_fn, location, semantics)) = map_ctx {
                let adaptor = MapEachAdaptor::new(
                    map_fn.clone(),
                    location.clone(),
                    semantics.clone(),
                    if self.has(EXPAND_DIRECTORIES) {
                        expander.cloned()
                    } else {
                        None
                    },
                );
                let result = key_context.add_set_to_fingerprint_mapped(&adaptor, fingerprint, set);
                // The cache retains the adaptor as a key; dropping the
                // expander now keeps it from outliving this call.
                adaptor.clear_expander();
                result?;
            } else {
                key_context.add_set_to_fingerprint(fingerprint, set)?;
            }
        } else {
            let count = slots[argi].expect_count();
            argi += 1;
            let values: Vec<Value> = slots[argi..argi + count]
                .iter()
                .map(|slot| slot.expect_value().clone())
                .collect();
            argi += count;
            let values = maybe_expand_directories(
                self.has(EXPAND_DIRECTORIES),
                expander,
                values,
                &NoopRemapper,
            )?;
            if let Some((map_fn, location, semantics)) = map_ctx {
                apply_map_each(
                    map_fn,
                    &values,
                    &mut |s| {
                        fingerprint.add_str(&s);
                    },
                    location,
                    expander,
                    semantics,
                )?;
            } else {
                for value in &values {
                    fingerprint.add_str(&value.expand_to_command_line());
                }
            }
        }

        if self.has(EXPAND_DIRECTORIES) {
            fingerprint.add_uuid(EXPAND_DIRECTORIES_TAG);
        }
        if self.has(UNIQUIFY) {
            fingerprint.add_uuid(UNIQUIFY_TAG);
        }
        if self.has(OMIT_IF_EMPTY) {
            fingerprint.add_uuid(OMIT_IF_EMPTY_TAG);
        }
        if self.has(HAS_ARG_NAME) {
            let arg_name = slots[argi].expect_str();
            argi += 1;
            fingerprint.add_uuid(ARG_NAME_TAG);
            fingerprint.add_str(arg_name);
        }
        if self.has(HAS_FORMAT_EACH) {
            let format = slots[argi].expect_str();
            argi += 1;
            fingerprint.add_uuid(FORMAT_EACH_TAG);
            fingerprint.add_str(format);
        }
        if self.has(HAS_BEFORE_EACH) {
            let before_each = slots[argi].expect_str();
            argi += 1;
            fingerprint.add_uuid(BEFORE_EACH_TAG);
            fingerprint.add_str(before_each);
        } else if self.has(HAS_JOIN_WITH) {
            let join_with = slots[argi].expect_str();
            argi += 1;
            fingerprint.add_uuid(JOIN_WITH_TAG);
            fingerprint.add_str(join_with);
            if self.has(HAS_FORMAT_JOINED) {
                let format_joined = slots[argi].expect_str();
                argi += 1;
                fingerprint.add_uuid(FORMAT_JOINED_TAG);
                fingerprint.add_str(format_joined);
            }
        }
        if self.has(HAS_TERMINATE_WITH) {
            let terminate_with = slots[argi].expect_str();
            argi += 1;
            fingerprint.add_uuid(TERMINATE_WITH_TAG);
            fingerprint.add_str(terminate_with);
        }
        Ok(argi)
    }
}

/// A pending vector argument, accumulated by rule code before it is
/// serialised into the instruction stream.
pub struct VectorSpec {
    list: Vec<Value>,
    set: Option<Arc<dyn LazySet>>,
    location: Option<Location>,
    map_each: Option<Arc<dyn Callable>>,
    arg_name: Option<String>,
    format_each: Option<String>,
    before_each: Option<String>,
    join_with: Option<String>,
    format_joined: Option<String>,
    terminate_with: Option<String>,
    expand_directories: bool,
    uniquify: bool,
    omit_if_empty: bool,
}

impl VectorSpec {
    pub fn from_list(values: Vec<Value>) -> Self {
        VectorSpec {
            list: values,
            set: None,
            location: None,
            map_each: None,
            arg_name: None,
            format_each: None,
            before_each: None,
            join_with: None,
            format_joined: None,
            terminate_with: None,
            expand_directories: false,
            uniquify: false,
            omit_if_empty: false,
        }
    }

    pub fn from_set(set: Arc<dyn LazySet>) -> Self {
        let mut spec = VectorSpec::from_list(Vec::new());
        spec.set = Some(set);
        spec
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn map_each(mut self, map_fn: Arc<dyn Callable>) -> Self {
        self.map_each = Some(map_fn);
        self
    }

    pub fn arg_name(mut self, arg_name: impl Into<String>) -> Self {
        self.arg_name = Some(arg_name.into());
        self
    }

    pub fn format_each(mut self, format: impl Into<String>) -> Self {
        self.format_each = Some(format.into());
        self
    }

    pub fn before_each(mut self, before_each: impl Into<String>) -> Self {
        self.before_each = Some(before_each.into());
        self
    }

    pub fn join_with(mut self, join_with: impl Into<String>) -> Self {
        self.join_with = Some(join_with.into());
        self
    }

    pub fn format_joined(mut self, format_joined: impl Into<String>) -> Self {
        self.format_joined = Some(format_joined.into());
        self
    }

    pub fn terminate_with(mut self, terminate_with: impl Into<String>) -> Self {
        self.terminate_with = Some(terminate_with.into());
        self
    }

    pub fn expand_directories(mut self, expand: bool) -> Self {
        self.expand_directories = expand;
        self
    }

    pub fn uniquify(mut self, uniquify: bool) -> Self {
        self.uniquify = uniquify;
        self
    }

    pub fn omit_if_empty(mut self, omit: bool) -> Self {
        self.omit_if_empty = omit;
        self
    }
}

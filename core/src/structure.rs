//! Structuring engine: normalized JSON in, typed values out.
//!
//! # Design
//! Every target type carries its own construction rule through the
//! [`Structure`] trait: records list their fields through [`Fields`],
//! containers recurse, scalars check their JSON shape. A [`Converter`] sits
//! in front of those rules as a registry of per-type hooks keyed by
//! `TypeId`; a registered hook always wins, so new scalar conversions (the
//! date-time rule being the built-in one) plug in without touching any record
//! code. Structuring is all-or-nothing: a failure anywhere in a nested value
//! aborts the whole call and no partial record escapes.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::error::StructureError;

/// A type that can be built from a normalized JSON value.
pub trait Structure: Sized + 'static {
    /// Name used in error messages.
    const TARGET: &'static str;

    /// Build `Self` from `value`. Nested values must go through
    /// `converter.structure` so registered hooks apply at every depth.
    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError>;
}

type Hook = Box<dyn Fn(&Value) -> Result<Box<dyn Any>, StructureError> + Send + Sync>;

/// Registry of per-type conversion hooks consulted before a type's own rule.
pub struct Converter {
    hooks: HashMap<TypeId, Hook>,
}

impl Converter {
    /// A converter with the built-in date-time hook registered.
    pub fn new() -> Self {
        let mut converter = Self::empty();
        converter.register::<DateTime<Utc>, _>(datetime_hook);
        converter
    }

    /// A converter with no hooks at all.
    pub fn empty() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Register `hook` for `T`, replacing any previous hook for that type.
    pub fn register<T, F>(&mut self, hook: F)
    where
        T: 'static,
        F: Fn(&Value) -> Result<T, StructureError> + Send + Sync + 'static,
    {
        self.hooks.insert(
            TypeId::of::<T>(),
            Box::new(move |value| hook(value).map(|out| Box::new(out) as Box<dyn Any>)),
        );
    }

    pub fn has_hook<T: 'static>(&self) -> bool {
        self.hooks.contains_key(&TypeId::of::<T>())
    }

    /// Structure `value` as `T`, preferring a registered hook over `T`'s rule.
    pub fn structure<T: Structure>(&self, value: &Value) -> Result<T, StructureError> {
        match self.hooks.get(&TypeId::of::<T>()) {
            Some(hook) => hook(value)?
                .downcast::<T>()
                .map(|out| *out)
                .map_err(|_| StructureError::Type {
                    expected: T::TARGET,
                    found: "hook output of another type",
                }),
            None => T::structure(value, self),
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Field-by-field access to a mapping being structured into a record.
pub struct Fields<'a> {
    record: &'static str,
    map: &'a Map<String, Value>,
    converter: &'a Converter,
}

impl<'a> Fields<'a> {
    /// Fails with a type error unless `value` is a mapping.
    pub fn new(
        record: &'static str,
        value: &'a Value,
        converter: &'a Converter,
    ) -> Result<Self, StructureError> {
        match value {
            Value::Object(map) => Ok(Self {
                record,
                map,
                converter,
            }),
            other => Err(StructureError::Type {
                expected: record,
                found: kind(other),
            }),
        }
    }

    /// A field with no default. Absence is a `MissingField` error.
    pub fn required<T: Structure>(&self, field: &'static str) -> Result<T, StructureError> {
        match self.map.get(field) {
            Some(value) => self.converter.structure(value),
            None => Err(StructureError::MissingField {
                record: self.record,
                field,
            }),
        }
    }

    /// A field defaulting to `T::default()` when absent or null.
    pub fn or_default<T: Structure + Default>(&self, field: &str) -> Result<T, StructureError> {
        self.or_else(field, T::default)
    }

    /// A field defaulting to `default()` when absent or null.
    pub fn or_else<T: Structure>(
        &self,
        field: &str,
        default: impl FnOnce() -> T,
    ) -> Result<T, StructureError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(default()),
            Some(value) => self.converter.structure(value),
        }
    }
}

/// JSON shape name for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

impl Structure for bool {
    const TARGET: &'static str = "boolean";

    fn structure(value: &Value, _: &Converter) -> Result<Self, StructureError> {
        value.as_bool().ok_or(StructureError::Type {
            expected: Self::TARGET,
            found: kind(value),
        })
    }
}

impl Structure for i64 {
    const TARGET: &'static str = "integer";

    fn structure(value: &Value, _: &Converter) -> Result<Self, StructureError> {
        match value {
            Value::Number(n) => n.as_i64().ok_or_else(|| StructureError::Parse {
                target: Self::TARGET,
                value: n.to_string(),
            }),
            other => Err(StructureError::Type {
                expected: Self::TARGET,
                found: kind(other),
            }),
        }
    }
}

impl Structure for f64 {
    const TARGET: &'static str = "float";

    fn structure(value: &Value, _: &Converter) -> Result<Self, StructureError> {
        value.as_f64().ok_or(StructureError::Type {
            expected: Self::TARGET,
            found: kind(value),
        })
    }
}

impl Structure for String {
    const TARGET: &'static str = "string";

    fn structure(value: &Value, _: &Converter) -> Result<Self, StructureError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or(StructureError::Type {
                expected: Self::TARGET,
                found: kind(value),
            })
    }
}

impl Structure for Value {
    const TARGET: &'static str = "JSON value";

    fn structure(value: &Value, _: &Converter) -> Result<Self, StructureError> {
        Ok(value.clone())
    }
}

impl<T: Structure> Structure for Option<T> {
    const TARGET: &'static str = T::TARGET;

    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError> {
        match value {
            Value::Null => Ok(None),
            present => converter.structure(present).map(Some),
        }
    }
}

impl<T: Structure> Structure for Vec<T> {
    const TARGET: &'static str = "sequence";

    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError> {
        match value {
            Value::Array(items) => items.iter().map(|item| converter.structure(item)).collect(),
            other => Err(StructureError::Type {
                expected: Self::TARGET,
                found: kind(other),
            }),
        }
    }
}

impl<T: Structure> Structure for BTreeMap<String, T> {
    const TARGET: &'static str = "mapping";

    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError> {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| Ok((key.clone(), converter.structure(item)?)))
                .collect(),
            other => Err(StructureError::Type {
                expected: Self::TARGET,
                found: kind(other),
            }),
        }
    }
}

impl Structure for DateTime<Utc> {
    const TARGET: &'static str = "date-time";

    // Only reachable through a converter without the date-time hook.
    fn structure(_: &Value, _: &Converter) -> Result<Self, StructureError> {
        Err(StructureError::NoConverter {
            target: Self::TARGET,
        })
    }
}

fn datetime_hook(value: &Value) -> Result<DateTime<Utc>, StructureError> {
    match value {
        Value::String(s) => parse_datetime(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| StructureError::Parse {
                target: "date-time",
                value: n.to_string(),
            }),
        other => Err(StructureError::Type {
            expected: "date-time",
            found: kind(other),
        }),
    }
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a date-time string leniently. Strings without an offset are read as
/// UTC; a bare date is midnight UTC.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>, StructureError> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }
    Err(StructureError::Parse {
        target: "date-time",
        value: input.to_string(),
    })
}

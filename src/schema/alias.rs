//! Canonical field name <-> external JSON key mapping.
//!
//! Every mapping goes through an explicit table: the registry's per-entity
//! field lists, and the milestone/progress tables for `AC_*` achievement
//! keys. [`ObjectWriter`] applies the same tables in the encode direction so
//! re-encoding is the inverse of decoding.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaResult};
use crate::schema::achievement::{Milestone, ProgressField};
use crate::schema::registry::{EntitySpec, FieldSpec};
use crate::schema::types::Entity;

pub const MILESTONE_PREFIX: &str = "AC_";

impl EntitySpec {
    /// Field definition for a canonical name.
    pub fn field(&self, field: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.field == field)
    }

    /// Field definition for an external key.
    pub fn by_key(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.key == key)
    }

    pub fn is_registered_key(&self, key: &str) -> bool {
        self.by_key(key).is_some()
    }
}

pub fn external_key(spec: &'static EntitySpec, field: &str) -> SchemaResult<&'static str> {
    spec.field(field)
        .map(|f| f.key)
        .ok_or_else(|| SchemaError::UnregisteredField {
            entity: spec.name,
            field: field.to_string(),
        })
}

pub fn canonical_field(spec: &'static EntitySpec, key: &str) -> Option<&'static str> {
    spec.by_key(key).map(|f| f.field)
}

/// `AC_<MILESTONE>_<SUFFIX>`, e.g. `AC_STREAK_BONUS_UNLOCKED_AT`.
pub fn milestone_key(milestone: Milestone, field: ProgressField) -> String {
    format!("{MILESTONE_PREFIX}{}_{}", milestone.as_str(), field.suffix())
}

/// Inverse of [`milestone_key`]. Only registered milestones are recognized;
/// anything else belongs in the overflow bag.
pub fn split_milestone_key(key: &str) -> Option<(Milestone, ProgressField)> {
    let rest = key.strip_prefix(MILESTONE_PREFIX)?;
    ProgressField::ALL.iter().find_map(|field| {
        let name = rest.strip_suffix(field.suffix())?.strip_suffix('_')?;
        Milestone::lookup(name).map(|milestone| (milestone, *field))
    })
}

/// Builds the external JSON object for one entity.
///
/// The first mapping failure is kept and reported by [`ObjectWriter::finish`].
pub struct ObjectWriter {
    spec: &'static EntitySpec,
    map: Map<String, Value>,
    error: Option<SchemaError>,
}

impl ObjectWriter {
    pub fn new(spec: &'static EntitySpec) -> Self {
        Self {
            spec,
            map: Map::new(),
            error: None,
        }
    }

    fn record(&mut self, err: SchemaError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Fails the whole encoding with `err` unless an earlier failure exists.
    pub fn fail(&mut self, err: SchemaError) -> &mut Self {
        self.record(err);
        self
    }

    fn insert(&mut self, field: &str, value: Value) {
        match external_key(self.spec, field) {
            Ok(key) => {
                self.map.insert(key.to_string(), value);
            }
            Err(err) => self.record(err),
        }
    }

    pub fn put(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.insert(field, value.into());
        self
    }

    /// Unset optional fields are omitted.
    pub fn put_opt<T: Into<Value>>(&mut self, field: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.insert(field, value.into());
        }
        self
    }

    pub fn put_entity<T: Entity>(&mut self, field: &str, entity: &T) -> &mut Self {
        match entity.to_value() {
            Ok(value) => self.insert(field, value),
            Err(err) => self.record(err),
        }
        self
    }

    pub fn put_entities<T: Entity>(&mut self, field: &str, entities: &[T]) -> &mut Self {
        match entities
            .iter()
            .map(T::to_value)
            .collect::<SchemaResult<Vec<Value>>>()
        {
            Ok(values) => self.insert(field, Value::Array(values)),
            Err(err) => self.record(err),
        }
        self
    }

    pub fn put_entity_map<T: Entity>(
        &mut self,
        field: &str,
        entities: &BTreeMap<String, T>,
    ) -> &mut Self {
        let mut out = Map::new();
        for (key, entity) in entities {
            match entity.to_value() {
                Ok(value) => {
                    out.insert(key.clone(), value);
                }
                Err(err) => {
                    self.record(err);
                    return self;
                }
            }
        }
        self.insert(field, Value::Object(out));
        self
    }

    /// Inserts an already-external key, bypassing the field table.
    pub fn put_key(&mut self, key: String, value: impl Into<Value>) -> &mut Self {
        self.map.insert(key, value.into());
        self
    }

    pub fn extend_overflow(&mut self, extra: &Map<String, Value>) -> &mut Self {
        self.extend_overflow_where(extra, |_| false)
    }

    /// Copies overflow entries verbatim. A key that is registered, or that
    /// `reserved` claims, may only carry `null` into a slot nothing else
    /// wrote; anything else would decode as registered data and fails with
    /// [`SchemaError::OverflowCollision`].
    pub fn extend_overflow_where(
        &mut self,
        extra: &Map<String, Value>,
        reserved: impl Fn(&str) -> bool,
    ) -> &mut Self {
        for (key, value) in extra {
            let claimed = self.spec.is_registered_key(key) || reserved(key);
            if claimed && (!value.is_null() || self.map.contains_key(key)) {
                self.record(SchemaError::OverflowCollision {
                    entity: self.spec.name,
                    key: key.clone(),
                });
                continue;
            }
            self.map.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn finish(self) -> SchemaResult<Value> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Value::Object(self.map)),
        }
    }
}

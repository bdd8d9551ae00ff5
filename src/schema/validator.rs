use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{SchemaError, SchemaResult};
use crate::schema::registry::{EntitySpec, FieldSpec, KNOWN_VERSIONS};
use crate::schema::types::{Document, Entity, PrefValue};

/// JSON type name used in mismatch errors.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(n) if n.is_u64() => "integer out of range",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads one entity's fields out of a decoded JSON object.
///
/// Fields are addressed by canonical name and resolved to external keys
/// through the entity's registry table. Required fields that are absent
/// fail with [`SchemaError::MissingField`]; optional fields that are absent
/// or `null` read as unset.
pub struct ObjectReader<'a> {
    spec: &'static EntitySpec,
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> ObjectReader<'a> {
    pub fn new(spec: &'static EntitySpec, value: &'a Value, path: &str) -> SchemaResult<Self> {
        let map = value.as_object().ok_or_else(|| SchemaError::NotAnObject {
            entity: spec.name,
            path: path.to_string(),
            actual: kind_of(value),
        })?;
        Ok(Self {
            spec,
            map,
            path: path.to_string(),
        })
    }

    fn child_path(&self, key: &str) -> String {
        format!("{}.{key}", self.path)
    }

    fn field_spec(&self, field: &str) -> SchemaResult<&'static FieldSpec> {
        self.spec
            .field(field)
            .ok_or_else(|| SchemaError::UnregisteredField {
                entity: self.spec.name,
                field: field.to_string(),
            })
    }

    fn missing(&self, spec: &FieldSpec) -> SchemaError {
        SchemaError::MissingField {
            entity: self.spec.name,
            field: spec.field.to_string(),
            key: spec.key.to_string(),
            path: self.path.clone(),
        }
    }

    /// Type mismatch for a key outside the field table (e.g. milestone keys).
    pub fn mismatch_key(
        &self,
        field: String,
        key: &str,
        expected: &'static str,
        value: &Value,
    ) -> SchemaError {
        self.mismatch_at(field, key, self.path.clone(), expected, value)
    }

    fn mismatch_at(
        &self,
        field: String,
        key: &str,
        path: String,
        expected: &'static str,
        value: &Value,
    ) -> SchemaError {
        SchemaError::TypeMismatch {
            entity: self.spec.name,
            field,
            key: key.to_string(),
            path,
            expected,
            actual: kind_of(value),
        }
    }

    fn mismatch(&self, spec: &FieldSpec, value: &Value) -> SchemaError {
        self.mismatch_at(
            spec.field.to_string(),
            spec.key,
            self.path.clone(),
            spec.kind.expected(),
            value,
        )
    }

    /// Raw value of a field, `None` when an optional field is unset.
    pub fn get(&self, field: &str) -> SchemaResult<Option<(&'static FieldSpec, &'a Value)>> {
        let spec = self.field_spec(field)?;
        match self.map.get(spec.key) {
            None | Some(Value::Null) if !spec.is_required() => Ok(None),
            None => Err(self.missing(spec)),
            Some(value) => Ok(Some((spec, value))),
        }
    }

    fn require_value(&self, field: &str) -> SchemaResult<(&'static FieldSpec, &'a Value)> {
        match self.get(field)? {
            Some(found) => Ok(found),
            None => Err(self.missing(self.field_spec(field)?)),
        }
    }

    fn convert<T>(
        &self,
        field: &str,
        convert: impl FnOnce(&'a Value) -> Option<T>,
    ) -> SchemaResult<Option<T>> {
        match self.get(field)? {
            None => Ok(None),
            Some((spec, value)) => convert(value)
                .map(Some)
                .ok_or_else(|| self.mismatch(spec, value)),
        }
    }

    fn require<T>(&self, field: &str, value: Option<T>) -> SchemaResult<T> {
        match value {
            Some(value) => Ok(value),
            None => Err(self.missing(self.field_spec(field)?)),
        }
    }

    pub fn int(&self, field: &str) -> SchemaResult<Option<i64>> {
        self.convert(field, Value::as_i64)
    }

    pub fn require_int(&self, field: &str) -> SchemaResult<i64> {
        let value = self.int(field)?;
        self.require(field, value)
    }

    pub fn bool(&self, field: &str) -> SchemaResult<Option<bool>> {
        self.convert(field, Value::as_bool)
    }

    pub fn require_bool(&self, field: &str) -> SchemaResult<bool> {
        let value = self.bool(field)?;
        self.require(field, value)
    }

    pub fn string(&self, field: &str) -> SchemaResult<Option<String>> {
        self.convert(field, |v| v.as_str().map(str::to_string))
    }

    pub fn require_string(&self, field: &str) -> SchemaResult<String> {
        let value = self.string(field)?;
        self.require(field, value)
    }

    pub fn require_scalar(&self, field: &str) -> SchemaResult<PrefValue> {
        let value = self.convert(field, PrefValue::classify)?;
        self.require(field, value)
    }

    fn require_array(&self, field: &str) -> SchemaResult<(&'static FieldSpec, &'a Vec<Value>)> {
        let (spec, value) = self.require_value(field)?;
        let items = value.as_array().ok_or_else(|| self.mismatch(spec, value))?;
        Ok((spec, items))
    }

    pub fn require_int_list(&self, field: &str) -> SchemaResult<Vec<i64>> {
        let (spec, items) = self.require_array(field)?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_i64().ok_or_else(|| {
                    self.mismatch_at(
                        spec.field.to_string(),
                        spec.key,
                        format!("{}[{index}]", self.child_path(spec.key)),
                        "integer",
                        item,
                    )
                })
            })
            .collect()
    }

    pub fn require_raw_list(&self, field: &str) -> SchemaResult<Vec<Value>> {
        let (_, items) = self.require_array(field)?;
        Ok(items.clone())
    }

    pub fn require_entity<T: Entity>(&self, field: &str) -> SchemaResult<T> {
        let (spec, value) = self.require_value(field)?;
        T::decode_at(value, &self.child_path(spec.key))
    }

    pub fn require_entity_list<T: Entity>(&self, field: &str) -> SchemaResult<Vec<T>> {
        let (spec, items) = self.require_array(field)?;
        let list_path = self.child_path(spec.key);
        let decoded = items
            .iter()
            .enumerate()
            .map(|(index, item)| T::decode_at(item, &format!("{list_path}[{index}]")))
            .collect::<SchemaResult<Vec<T>>>()?;
        debug!(
            entity = T::spec().name,
            count = decoded.len(),
            path = %list_path,
            "decoded entity list"
        );
        Ok(decoded)
    }

    pub fn require_entity_map<T: Entity>(&self, field: &str) -> SchemaResult<BTreeMap<String, T>> {
        let (spec, value) = self.require_value(field)?;
        let entries = value.as_object().ok_or_else(|| self.mismatch(spec, value))?;
        let map_path = self.child_path(spec.key);
        entries
            .iter()
            .map(|(key, item)| {
                T::decode_at(item, &format!("{map_path}.{key}")).map(|entity| (key.clone(), entity))
            })
            .collect()
    }

    /// Keys of the input object, in input order.
    pub fn entries(&self) -> serde_json::map::Iter<'a> {
        self.map.iter()
    }

    /// Keys with no registered field, plus optional fields given as an
    /// explicit `null`, kept verbatim so re-encoding reproduces them.
    pub fn overflow(&self) -> Map<String, Value> {
        self.overflow_where(|_, _| true)
    }

    /// [`ObjectReader::overflow`] restricted to entries accepted by `keep`.
    pub fn overflow_where(&self, mut keep: impl FnMut(&str, &Value) -> bool) -> Map<String, Value> {
        self.map
            .iter()
            .filter(|(key, value)| {
                let unregistered = match self.spec.by_key(key) {
                    Some(field) => value.is_null() && !field.is_required(),
                    None => true,
                };
                unregistered && keep(key, value)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Non-fatal findings of a successful validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// `version` is outside the set the registry was written against.
    UnknownVersion { version: i64, known: Vec<i64> },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownVersion { version, known } => write!(
                f,
                "unknown export version {version} (known: {known:?}); fields were mapped best-effort"
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationOptions {
    pub known_versions: Vec<i64>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            known_versions: KNOWN_VERSIONS.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub document: Document,
    pub warnings: Vec<Warning>,
}

pub fn validate_document_with(value: &Value, options: &ValidationOptions) -> SchemaResult<Validation> {
    let document = Document::from_value(value)?;

    let mut warnings = Vec::new();
    if !options.known_versions.contains(&document.version) {
        warn!(
            version = document.version,
            known = ?options.known_versions,
            "export version not in the known set"
        );
        warnings.push(Warning::UnknownVersion {
            version: document.version,
            known: options.known_versions.clone(),
        });
    }

    debug!(
        version = document.version,
        entries = document.day_entries.len(),
        moods = document.custom_moods.len(),
        tags = document.tags.len(),
        "validated document"
    );
    Ok(Validation { document, warnings })
}

pub fn validate_document(value: &Value) -> SchemaResult<Validation> {
    validate_document_with(value, &ValidationOptions::default())
}

//! Bound parameter tracking and value coercion
//!
//! A [`ParamSet`] records exactly the parameters a caller supplied. Presence in the
//! set is the "bound" bit: `false`, `0`, `""` and `null` are all bound values, and an
//! absent name is never treated as its type's default.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde_json::{Map, Number, Value};

use crate::error::{CoreError, Result};
use crate::operation::{FieldKind, FieldSpec, OperationSpec, ScalarType};

/// The parameters a caller bound for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    values: BTreeMap<String, Value>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any earlier binding of the same name
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        if let Some(existing) = self.canonical_key(&name) {
            self.values.remove(&existing);
        }
        self.values.insert(name, value.into());
        self
    }

    /// Builder-style [`bind`](Self::bind)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(name, value);
        self
    }

    pub fn unbind(&mut self, name: &str) -> Option<Value> {
        let key = self.canonical_key(name)?;
        self.values.remove(&key)
    }

    /// Whether the caller supplied `name` at all (case-insensitive)
    pub fn is_bound(&self, name: &str) -> bool {
        self.canonical_key(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.canonical_key(name).and_then(|k| self.values.get(&k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bind every member of a JSON object
    pub fn from_json_object(object: Map<String, Value>) -> Self {
        Self {
            values: object.into_iter().collect(),
        }
    }

    /// Check every binding against `operation`, rename it to the declared spelling
    /// and coerce its value to the declared type.
    pub fn resolve(self, operation: &OperationSpec) -> Result<ParamSet> {
        let mut resolved = ParamSet::new();
        for (name, value) in self.values {
            let field = operation
                .find_param(&name)
                .ok_or_else(|| CoreError::UnknownParameter {
                    operation: operation.qualified_name(),
                    name: name.clone(),
                })?;
            let value = coerce(field, value)?;
            resolved.values.insert(field.param.to_string(), value);
        }
        Ok(resolved)
    }

    fn canonical_key(&self, name: &str) -> Option<String> {
        self.values
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParamSet::new();
        for (k, v) in iter {
            set.bind(k, v);
        }
        set
    }
}

/// Parse a `Name=Value` pair as typed on the command line
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| CoreError::InvalidParameter {
            name: raw.to_string(),
            message: "expected Name=Value".to_string(),
        })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidParameter {
            name: raw.to_string(),
            message: "parameter name is empty".to_string(),
        });
    }
    Ok((name.to_string(), Value::String(value.to_string())))
}

/// Coerce a bound value to the shape `field` declares
///
/// `null` always stays `null`. Text is parsed according to the field kind; values
/// that are already the right JSON type pass through.
pub fn coerce(field: &FieldSpec, value: Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match field.kind {
        FieldKind::Scalar(ty) => coerce_scalar(field.param, ty, value),
        FieldKind::Enum(allowed) => coerce_enum(field.param, allowed, value),
        FieldKind::Map => coerce_map(field.param, value),
        FieldKind::List(ty) => coerce_list(field.param, ty, value),
        FieldKind::ObjectList => coerce_object_list(field.param, value),
        FieldKind::Nested(_) => Err(invalid(
            field.param,
            "nested objects are bound through their individual sub-parameters",
        )),
    }
}

fn invalid(name: &str, message: impl Into<String>) -> CoreError {
    CoreError::InvalidParameter {
        name: name.to_string(),
        message: message.into(),
    }
}

fn coerce_scalar(name: &str, ty: ScalarType, value: Value) -> Result<Value> {
    match (ty, value) {
        (ScalarType::String, Value::String(s)) => Ok(Value::String(s)),
        (ScalarType::String, v @ (Value::Number(_) | Value::Bool(_))) => {
            Ok(Value::String(v.to_string()))
        }

        (ScalarType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
            Ok(Value::Number(n))
        }
        (ScalarType::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(name, format!("'{}' is not an integer", s))),

        (ScalarType::Float, Value::Number(n)) => Ok(Value::Number(n)),
        (ScalarType::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid(name, format!("'{}' is not a number", s))),

        (ScalarType::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ScalarType::Boolean, Value::String(s)) => parse_bool(&s)
            .map(Value::Bool)
            .ok_or_else(|| invalid(name, format!("'{}' is not a boolean", s))),

        (ScalarType::Timestamp, Value::Number(n)) => Ok(Value::Number(n)),
        (ScalarType::Timestamp, Value::String(s)) => parse_timestamp(&s)
            .map(Value::from)
            .ok_or_else(|| {
                invalid(
                    name,
                    format!("'{}' is neither epoch seconds nor an RFC 3339 timestamp", s),
                )
            }),

        (ty, other) => Err(invalid(
            name,
            format!("expected {:?}, got {}", ty, json_type(&other)),
        )),
    }
}

fn coerce_enum(name: &str, allowed: &[&str], value: Value) -> Result<Value> {
    let Value::String(s) = value else {
        return Err(invalid(name, "expected a string constant"));
    };
    // Canonical spelling when known; unknown constants pass through untouched.
    let canonical = allowed
        .iter()
        .find(|a| a.eq_ignore_ascii_case(s.trim()))
        .map(|a| a.to_string())
        .unwrap_or(s);
    Ok(Value::String(canonical))
}

fn coerce_map(name: &str, value: Value) -> Result<Value> {
    match value {
        Value::Object(obj) => {
            let mut out = Map::new();
            for (k, v) in obj {
                let v = match v {
                    Value::String(s) => s,
                    Value::Null => {
                        return Err(invalid(name, format!("map entry '{}' has no value", k)));
                    }
                    other => other.to_string(),
                };
                out.insert(k, Value::String(v));
            }
            Ok(Value::Object(out))
        }
        Value::String(s) if s.trim_start().starts_with('{') => {
            let parsed: Value = serde_json::from_str(&s)
                .map_err(|e| invalid(name, format!("invalid JSON object: {}", e)))?;
            coerce_map(name, parsed)
        }
        Value::String(s) => {
            let mut out = Map::new();
            for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let (k, v) = pair
                    .split_once('=')
                    .ok_or_else(|| invalid(name, format!("map entry '{}' is not key=value", pair)))?;
                out.insert(k.trim().to_string(), Value::String(v.trim().to_string()));
            }
            Ok(Value::Object(out))
        }
        other => Err(invalid(
            name,
            format!("expected a map, got {}", json_type(&other)),
        )),
    }
}

fn coerce_list(name: &str, ty: ScalarType, value: Value) -> Result<Value> {
    let items = match value {
        Value::Array(items) => items,
        Value::String(s) if s.trim_start().starts_with('[') => match serde_json::from_str(&s) {
            Ok(Value::Array(items)) => items,
            Ok(_) => return Err(invalid(name, "expected a JSON array")),
            Err(e) => return Err(invalid(name, format!("invalid JSON array: {}", e))),
        },
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Value::String(p.to_string()))
            .collect(),
        scalar => vec![scalar],
    };
    items
        .into_iter()
        .map(|item| coerce_scalar(name, ty, item))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

fn coerce_object_list(name: &str, value: Value) -> Result<Value> {
    match value {
        Value::Array(items) => {
            if let Some(bad) = items.iter().find(|i| !i.is_object()) {
                return Err(invalid(
                    name,
                    format!("list entries must be objects, got {}", json_type(bad)),
                ));
            }
            Ok(Value::Array(items))
        }
        Value::Object(obj) => Ok(Value::Array(vec![Value::Object(obj)])),
        Value::String(s) => {
            let parsed: Value = serde_json::from_str(&s)
                .map_err(|e| invalid(name, format!("invalid JSON: {}", e)))?;
            coerce_object_list(name, parsed)
        }
        other => Err(invalid(
            name,
            format!("expected a list of objects, got {}", json_type(&other)),
        )),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "$true" => Some(true),
        "false" | "0" | "no" | "off" | "$false" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.timestamp()))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

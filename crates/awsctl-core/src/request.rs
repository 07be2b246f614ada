//! Request construction from a sparse parameter set
//!
//! Three population rules apply, recursively:
//!
//! * scalars, enums and references are copied only when bound;
//! * nested objects are assembled from their own sub-parameters and attached only if
//!   at least one sub-field was set, so an all-defaults stub never overwrites
//!   server-side defaults;
//! * maps and lists are copied verbatim when bound.
//!
//! Nothing here validates cross-field consistency. Required parameters that are
//! missing or empty produce warnings; the service remains the authority.

use serde_json::{Map, Value};
use tracing::warn;

use crate::operation::{FieldKind, FieldSpec, OperationSpec};
use crate::params::ParamSet;

/// A request body plus any local validation warnings raised while building it
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub body: Map<String, Value>,
    pub warnings: Vec<String>,
}

impl BuiltRequest {
    /// Request body as a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.body.clone())
    }

    /// Set or clear a top-level member, used for continuation tokens
    pub fn set_member(&mut self, member: &str, value: Option<Value>) {
        match value {
            Some(v) => {
                self.body.insert(member.to_string(), v);
            }
            None => {
                self.body.remove(member);
            }
        }
    }

    pub fn contains(&self, member: &str) -> bool {
        self.body.contains_key(member)
    }
}

/// Builds request bodies for one operation
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    operation: &'a OperationSpec,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(operation: &'a OperationSpec) -> Self {
        Self { operation }
    }

    /// Build the request body from `params`
    pub fn build(&self, params: &ParamSet) -> BuiltRequest {
        let mut warnings = Vec::new();
        let body = build_object(self.operation.fields, params, &mut warnings);
        for warning in &warnings {
            warn!(operation = %self.operation.qualified_name(), "{}", warning);
        }
        BuiltRequest { body, warnings }
    }
}

fn build_object(
    fields: &'static [FieldSpec],
    params: &ParamSet,
    warnings: &mut Vec<String>,
) -> Map<String, Value> {
    let mut object = Map::new();

    for field in fields {
        if let FieldKind::Nested(children) = field.kind {
            // Sub-field warnings only matter once the object is actually sent
            let mut nested_warnings = Vec::new();
            let nested = build_object(children, params, &mut nested_warnings);
            if nested.is_empty() {
                if field.required {
                    warnings.push(format!(
                        "Required parameter group '{}' has no values set",
                        field.param
                    ));
                }
            } else {
                warnings.append(&mut nested_warnings);
                object.insert(field.member.to_string(), Value::Object(nested));
            }
            continue;
        }

        match params.get(field.param) {
            None => {
                if field.required {
                    warnings.push(format!(
                        "Required parameter '{}' was not supplied",
                        field.param
                    ));
                }
            }
            Some(Value::Null) => {
                if field.required {
                    warnings.push(format!(
                        "Required parameter '{}' is bound to a null value",
                        field.param
                    ));
                }
            }
            Some(value) => {
                if field.required && is_empty(value) {
                    warnings.push(format!(
                        "Required parameter '{}' is bound to an empty value",
                        field.param
                    ));
                }
                if let (FieldKind::Enum(allowed), Value::String(s)) = (field.kind, value)
                    && !allowed.contains(&s.as_str())
                {
                    warnings.push(format!(
                        "Value '{}' for parameter '{}' is not one of the known constants ({})",
                        s,
                        field.param,
                        allowed.join(", ")
                    ));
                }
                object.insert(field.member.to_string(), value.clone());
            }
        }
    }

    object
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

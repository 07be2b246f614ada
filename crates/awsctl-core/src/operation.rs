//! Static operation descriptors
//!
//! An [`OperationSpec`] carries everything the generic pipeline needs to run one
//! remote operation: where to send it, which parameters it accepts and how they map
//! onto request members, how it paginates and whether it mutates state. Descriptors
//! are plain `'static` data so a catalog is a table, not code.

use serde::Serialize;

/// A remote service the catalog knows how to reach
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServiceSpec {
    /// Short id used on the command line (`codebuild`)
    pub id: &'static str,
    /// Display name
    pub title: &'static str,
    /// Host prefix used to derive the regional endpoint
    pub endpoint_prefix: &'static str,
    /// Service name used in the SigV4 credential scope
    pub signing_name: &'static str,
    /// Prefix of the `X-Amz-Target` header (`CodeBuild_20161006`)
    pub target_prefix: &'static str,
}

/// Primitive value types a parameter can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Integer,
    Float,
    Boolean,
    /// Epoch seconds or RFC 3339; sent as epoch seconds
    Timestamp,
}

/// Shape of a single field
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar(ScalarType),
    /// Enumerated constant with its known values
    Enum(&'static [&'static str]),
    /// Flat string to string map
    Map,
    /// List of scalars
    List(ScalarType),
    /// List of nested objects, passed through as JSON
    ObjectList,
    /// Nested configuration object whose sub-fields are bound individually
    Nested(&'static [FieldSpec]),
}

/// One request member and the parameter that feeds it
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    /// Parameter name the caller binds. For nested fields this is only a label;
    /// callers bind the sub-fields.
    pub param: &'static str,
    /// Member name in the request body
    pub member: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn new(param: &'static str, member: &'static str, kind: FieldKind) -> Self {
        Self {
            param,
            member,
            kind,
            required: false,
            description: "",
        }
    }

    pub const fn string(param: &'static str, member: &'static str) -> Self {
        Self::new(param, member, FieldKind::Scalar(ScalarType::String))
    }

    pub const fn integer(param: &'static str, member: &'static str) -> Self {
        Self::new(param, member, FieldKind::Scalar(ScalarType::Integer))
    }

    pub const fn boolean(param: &'static str, member: &'static str) -> Self {
        Self::new(param, member, FieldKind::Scalar(ScalarType::Boolean))
    }

    pub const fn one_of(
        param: &'static str,
        member: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self::new(param, member, FieldKind::Enum(values))
    }

    pub const fn nested(
        param: &'static str,
        member: &'static str,
        fields: &'static [FieldSpec],
    ) -> Self {
        Self::new(param, member, FieldKind::Nested(fields))
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.kind, FieldKind::Nested(_))
    }
}

/// How an operation pages its results
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PaginationSpec {
    /// Request member that carries the continuation token
    pub input_token: &'static str,
    /// Response member that carries the next token
    pub output_token: &'static str,
    /// Response member holding the page's items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<&'static str>,
    /// Request member that bounds the page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<&'static str>,
}

/// How destructive an operation is; drives the confirmation gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmImpact {
    None,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ConfirmImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmImpact::None => write!(f, "none"),
            ConfirmImpact::Low => write!(f, "low"),
            ConfirmImpact::Medium => write!(f, "medium"),
            ConfirmImpact::High => write!(f, "high"),
        }
    }
}

impl ConfirmImpact {
    /// Operations at `Medium` or above change remote state and must be confirmed
    pub fn is_mutating(self) -> bool {
        self >= ConfirmImpact::Medium
    }
}

/// A single remote operation
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OperationSpec {
    pub service: &'static ServiceSpec,
    /// Wire name of the operation (`ListProjects`)
    pub name: &'static str,
    pub summary: &'static str,
    pub impact: ConfirmImpact,
    /// Parameter whose value names the resource being changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_param: Option<&'static str>,
    pub fields: &'static [FieldSpec],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationSpec>,
    /// Response member emitted by default; when `None`, a paginated operation
    /// emits its page items and any other operation the whole response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_select: Option<&'static str>,
}

impl OperationSpec {
    /// `service:Operation`, used in logs and confirmation prompts
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.service.id, self.name)
    }

    /// Value for the `X-Amz-Target` header
    pub fn target(&self) -> String {
        format!("{}.{}", self.service.target_prefix, self.name)
    }

    pub fn is_mutating(&self) -> bool {
        self.impact.is_mutating()
    }

    pub fn is_paginated(&self) -> bool {
        self.pagination.is_some()
    }

    /// Selector used when the caller gives none
    pub fn default_selector(&self) -> Option<&'static str> {
        self.default_select.or_else(|| self.pagination.and_then(|p| p.items))
    }

    /// Request member that bounds the page size, if the operation has one
    pub fn page_size_member(&self) -> Option<&'static str> {
        self.pagination.and_then(|p| p.limit)
    }

    /// Every bindable field, with nested sub-fields flattened depth first
    pub fn leaf_fields(&self) -> Vec<&'static FieldSpec> {
        let mut out = Vec::new();
        collect_leaves(self.fields, &mut out);
        out
    }

    /// Case-insensitive lookup of a bindable field by parameter name
    pub fn find_param(&self, name: &str) -> Option<&'static FieldSpec> {
        self.leaf_fields()
            .into_iter()
            .find(|f| f.param.eq_ignore_ascii_case(name))
    }
}

fn collect_leaves(fields: &'static [FieldSpec], out: &mut Vec<&'static FieldSpec>) {
    for field in fields {
        match field.kind {
            FieldKind::Nested(children) => collect_leaves(children, out),
            _ => out.push(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SVC: ServiceSpec = ServiceSpec {
        id: "demo",
        title: "Demo",
        endpoint_prefix: "demo",
        signing_name: "demo",
        target_prefix: "Demo_2020",
    };

    static INNER: [FieldSpec; 2] = [
        FieldSpec::string("Cfg_Name", "name"),
        FieldSpec::integer("Cfg_Size", "size"),
    ];

    static FIELDS: [FieldSpec; 2] = [
        FieldSpec::string("Name", "name").required(),
        FieldSpec::nested("Cfg", "config", &INNER),
    ];

    static OP: OperationSpec = OperationSpec {
        service: &SVC,
        name: "PutThing",
        summary: "",
        impact: ConfirmImpact::Medium,
        target_param: Some("Name"),
        fields: &FIELDS,
        pagination: None,
        default_select: None,
    };

    #[test]
    fn test_leaf_fields_flatten_nested() {
        let names: Vec<_> = OP.leaf_fields().iter().map(|f| f.param).collect();
        assert_eq!(names, vec!["Name", "Cfg_Name", "Cfg_Size"]);
    }

    #[test]
    fn test_find_param_is_case_insensitive() {
        assert_eq!(OP.find_param("cfg_size").map(|f| f.member), Some("size"));
        assert!(OP.find_param("Cfg").is_none());
    }

    #[test]
    fn test_default_selector_falls_back_to_page_items() {
        let paged = OperationSpec {
            name: "ListThings",
            impact: ConfirmImpact::None,
            target_param: None,
            pagination: Some(PaginationSpec {
                input_token: "NextToken",
                output_token: "NextToken",
                items: Some("Things"),
                limit: Some("MaxResults"),
            }),
            ..OP
        };
        assert_eq!(paged.default_selector(), Some("Things"));
        assert_eq!(paged.page_size_member(), Some("MaxResults"));

        let explicit = OperationSpec {
            default_select: Some("Summary"),
            ..paged
        };
        assert_eq!(explicit.default_selector(), Some("Summary"));

        assert_eq!(OP.default_selector(), None);
        assert_eq!(OP.page_size_member(), None);
    }

    #[test]
    fn test_target_and_impact() {
        assert_eq!(OP.target(), "Demo_2020.PutThing");
        assert!(OP.is_mutating());
        assert!(!ConfirmImpact::Low.is_mutating());
    }
}

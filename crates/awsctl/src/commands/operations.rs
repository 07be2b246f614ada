//! Catalog browsing commands

use awsctl_core::operation::ServiceSpec;
use awsctl_core::{ConfirmImpact, FieldKind, FieldSpec, OperationSpec, ScalarType, catalog};
use serde_json::{Value, json};
use tracing::debug;

use crate::cli::{OperationCommands, OutputFormat as CliOutputFormat};
use crate::error::{AwsCtlError, Result as CliResult};
use crate::output::{self, OutputFormat};

pub fn handle_operations_command(
    cmd: &OperationCommands,
    output_format: CliOutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    match cmd {
        OperationCommands::List {
            service,
            min_impact,
        } => {
            let rows = list_rows(service.as_deref(), *min_impact)?;
            debug!("Listing {} operation(s)", rows.len());
            let format = OutputFormat::resolve(output_format, OutputFormat::Table);
            output::print_output(rows, format, query)?;
        }
        OperationCommands::Describe { service, operation } => {
            let spec = catalog::lookup(service, operation)?;
            let format = OutputFormat::resolve(output_format, OutputFormat::Json);
            output::print_output(describe(spec), format, query)?;
        }
        OperationCommands::Services => {
            let rows: Vec<Value> = catalog::services().iter().map(|s| service_row(s)).collect();
            let format = OutputFormat::resolve(output_format, OutputFormat::Table);
            output::print_output(rows, format, query)?;
        }
    }
    Ok(())
}

fn list_rows(service: Option<&str>, min_impact: Option<ConfirmImpact>) -> CliResult<Vec<Value>> {
    let operations: Vec<&OperationSpec> = match service {
        Some(id) => {
            let spec = catalog::find_service(id).ok_or_else(|| AwsCtlError::InvalidInput {
                message: format!("unknown service '{}'", id),
            })?;
            catalog::operations_for(spec.id)
        }
        None => catalog::operations().to_vec(),
    };

    Ok(operations
        .into_iter()
        .filter(|op| min_impact.is_none_or(|min| op.impact >= min))
        .map(|op| {
            json!({
                "service": op.service.id,
                "operation": op.name,
                "impact": op.impact,
                "paginated": op.is_paginated(),
                "summary": op.summary,
            })
        })
        .collect())
}

fn service_row(service: &ServiceSpec) -> Value {
    json!({
        "service": service.id,
        "title": service.title,
        "target_prefix": service.target_prefix,
        "operations": catalog::operations_for(service.id).len(),
    })
}

fn describe(op: &OperationSpec) -> Value {
    let mut parameters = Vec::new();
    parameter_rows(op.fields, "", &mut parameters);

    let mut out = json!({
        "operation": op.qualified_name(),
        "target": op.target(),
        "summary": op.summary,
        "impact": op.impact,
        "mutating": op.is_mutating(),
        "parameters": parameters,
    });
    if let Some(target) = op.target_param {
        out["target_param"] = json!(target);
    }
    if let Some(pagination) = &op.pagination {
        out["pagination"] = json!(pagination);
    }
    if let Some(select) = op.default_selector() {
        out["default_select"] = json!(select);
    }
    out
}

/// Flatten the field table; nested groups contribute their sub-fields with a dotted
/// member path
fn parameter_rows(fields: &[FieldSpec], prefix: &str, out: &mut Vec<Value>) {
    for field in fields {
        let member = format!("{}{}", prefix, field.member);
        if let FieldKind::Nested(children) = field.kind {
            parameter_rows(children, &format!("{}.", member), out);
            continue;
        }
        let mut row = json!({
            "name": field.param,
            "member": member,
            "type": kind_label(&field.kind),
            "required": field.required,
        });
        if !field.description.is_empty() {
            row["description"] = json!(field.description);
        }
        out.push(row);
    }
}

fn kind_label(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Scalar(t) => scalar_label(*t).to_string(),
        FieldKind::Enum(values) => values.join("|"),
        FieldKind::Map => "map".to_string(),
        FieldKind::List(t) => format!("list<{}>", scalar_label(*t)),
        FieldKind::ObjectList => "list<object>".to_string(),
        FieldKind::Nested(_) => "object".to_string(),
    }
}

fn scalar_label(t: ScalarType) -> &'static str {
    match t {
        ScalarType::String => "string",
        ScalarType::Integer => "integer",
        ScalarType::Float => "float",
        ScalarType::Boolean => "boolean",
        ScalarType::Timestamp => "timestamp",
    }
}

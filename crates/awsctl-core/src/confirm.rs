//! Confirmation gate for operations that change remote state

use serde::Serialize;

use crate::operation::{ConfirmImpact, OperationSpec};
use crate::params::ParamSet;

/// What is about to happen, as shown to whoever confirms it
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmRequest {
    /// `service:Operation`
    pub operation: String,
    /// The resource being changed, or the operation name when none is bound
    pub target: String,
    pub impact: ConfirmImpact,
}

impl ConfirmRequest {
    pub fn for_operation(operation: &OperationSpec, params: &ParamSet) -> Self {
        let target = operation
            .target_param
            .and_then(|p| params.get(p))
            .and_then(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .unwrap_or_else(|| operation.name.to_string());

        Self {
            operation: operation.qualified_name(),
            target,
            impact: operation.impact,
        }
    }

    /// One-line prompt text
    pub fn prompt(&self) -> String {
        format!(
            "Performing operation {} on target \"{}\"",
            self.operation, self.target
        )
    }
}

/// Decides whether a mutating operation may proceed
pub trait Confirmer: Send + Sync {
    fn confirm(&self, request: &ConfirmRequest) -> bool;
}

/// Approves everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn confirm(&self, _request: &ConfirmRequest) -> bool {
        true
    }
}

/// Declines everything, for non-interactive callers
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirmer for NeverConfirm {
    fn confirm(&self, _request: &ConfirmRequest) -> bool {
        false
    }
}

impl<F> Confirmer for F
where
    F: Fn(&ConfirmRequest) -> bool + Send + Sync,
{
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}

/// Whether `operation` may run. Non-mutating operations and forced invocations never
/// consult the confirmer.
pub fn should_proceed(
    operation: &OperationSpec,
    params: &ParamSet,
    force: bool,
    confirmer: &dyn Confirmer,
) -> bool {
    if !operation.is_mutating() || force {
        return true;
    }
    confirmer.confirm(&ConfirmRequest::for_operation(operation, params))
}

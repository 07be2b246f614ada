//! Uniform output records
//!
//! Every page of a successful call and every failure becomes one [`Envelope`].
//! A success carries the selected payload, the full response and named notes; a
//! failure carries exactly one error and nothing else.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::operation::OperationSpec;
use crate::params::ParamSet;

/// Note carrying the continuation token after a page (empty when exhausted)
pub const NOTE_NEXT_TOKEN: &str = "NextToken";
/// Note carrying the 1-based page number
pub const NOTE_PAGE_NUMBER: &str = "PageNumber";
/// Note carrying local validation warnings
pub const NOTE_WARNINGS: &str = "Warnings";

/// Outcome of one page or one failed call
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Success {
        payload: Value,
        response: Value,
        #[serde(skip_serializing_if = "Map::is_empty")]
        notes: Map<String, Value>,
    },
    Failure {
        #[serde(serialize_with = "serialize_error")]
        error: CoreError,
    },
}

/// `{"message": ..., "source": [...]}`, with the causes outermost first
fn serialize_error<S: Serializer>(error: &CoreError, serializer: S) -> Result<S::Ok, S::Error> {
    let mut causes = Vec::new();
    let mut next = std::error::Error::source(error);
    while let Some(cause) = next {
        causes.push(cause.to_string());
        next = std::error::Error::source(cause);
    }

    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("message", &error.to_string())?;
    if !causes.is_empty() {
        map.serialize_entry("source", &causes)?;
    }
    map.end()
}

impl Envelope {
    pub fn success(payload: Value, response: Value) -> Self {
        Envelope::Success {
            payload,
            response,
            notes: Map::new(),
        }
    }

    pub fn failure(error: CoreError) -> Self {
        Envelope::Failure { error }
    }

    /// Attach a named note; ignored on failures
    #[must_use]
    pub fn with_note(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Envelope::Success { notes, .. } = &mut self {
            notes.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Envelope::Success { payload, .. } => Some(payload),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn response(&self) -> Option<&Value> {
        match self {
            Envelope::Success { response, .. } => Some(response),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn note(&self, name: &str) -> Option<&Value> {
        match self {
            Envelope::Success { notes, .. } => notes.get(name),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Envelope::Failure { error } => Some(error),
            Envelope::Success { .. } => None,
        }
    }

    /// Continuation token reported with this page, if any
    pub fn next_token(&self) -> Option<&str> {
        self.note(NOTE_NEXT_TOKEN).and_then(Value::as_str)
    }
}

/// Receives envelopes as they are produced
pub trait OutputSink {
    fn emit(&mut self, envelope: Envelope);
}

impl OutputSink for Vec<Envelope> {
    fn emit(&mut self, envelope: Envelope) {
        self.push(envelope);
    }
}

/// Which part of a response becomes the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `*`: the whole response
    Whole,
    /// `^Name`: the value bound to a parameter
    Param(String),
    /// A dot-separated response member path
    Member(Vec<String>),
}

impl Selector {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            Selector::Whole
        } else if let Some(param) = raw.strip_prefix('^') {
            Selector::Param(param.trim().to_string())
        } else {
            Selector::Member(raw.split('.').map(str::to_string).collect())
        }
    }

    /// The operation's default selector
    pub fn for_operation(operation: &OperationSpec) -> Self {
        operation
            .default_selector()
            .map(Selector::parse)
            .unwrap_or(Selector::Whole)
    }

    /// Produce the payload for one page. Missing members select `null`.
    pub fn apply(&self, response: &Value, params: &ParamSet) -> Value {
        match self {
            Selector::Whole => response.clone(),
            Selector::Param(name) => params.get(name).cloned().unwrap_or(Value::Null),
            Selector::Member(path) => path
                .iter()
                .try_fold(response, |node, key| node.get(key))
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}

impl FromStr for Selector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Selector::parse(s))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Whole => write!(f, "*"),
            Selector::Param(name) => write!(f, "^{}", name),
            Selector::Member(path) => write!(f, "{}", path.join(".")),
        }
    }
}

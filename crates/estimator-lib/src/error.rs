//! Error and diagnostic types
//!
//! Nothing in the engine is fatal to a run. Quantity and decode failures are
//! scoped to one field or one document and are collected as [`Diagnostic`]s
//! next to the estimate. Only reading the manifest source can fail outright.

use crate::models::{ObjectKey, ResourceField};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// A resource quantity string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid number in quantity {0:?}")]
    InvalidNumber(String),

    #[error("unknown suffix {suffix:?} in quantity {input:?}")]
    UnknownSuffix { input: String, suffix: String },

    #[error("negative quantity {0:?}")]
    Negative(String),

    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

/// A document did not match the shape its declared kind requires
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid YAML: {0}")]
    InvalidYaml(String),

    #[error("missing required field `{field}`")]
    MissingField {
        kind: Option<String>,
        field: &'static str,
    },

    #[error("does not match the expected shape: {reason}")]
    Shape { kind: String, reason: String },
}

impl DecodeError {
    /// Declared kind of the failing document, when it got that far
    pub fn kind(&self) -> Option<&str> {
        match self {
            DecodeError::InvalidYaml(_) => None,
            DecodeError::MissingField { kind, .. } => kind.as_deref(),
            DecodeError::Shape { kind, .. } => Some(kind),
        }
    }
}

/// Fatal errors surfaced by the convenience entry points
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How much attention a diagnostic needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Note,
}

/// What went wrong, and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// One container field was unparseable and counted as zero
    MalformedQuantity {
        object: ObjectKey,
        container: Option<String>,
        field: ResourceField,
        value: String,
        reason: String,
    },
    /// A whole document was skipped
    Decode { kind: Option<String>, reason: String },
    /// An autoscaler target never showed up as a workload
    UnresolvedReference { target: ObjectKey },
}

/// A collected, non-fatal event from one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based document position within the stream, if the event has one
    pub document: Option<usize>,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn malformed_quantity(
        document: usize,
        object: ObjectKey,
        container: Option<String>,
        field: ResourceField,
        value: String,
        error: &QuantityError,
    ) -> Self {
        Self {
            document: Some(document),
            severity: Severity::Warning,
            kind: DiagnosticKind::MalformedQuantity {
                object,
                container,
                field,
                value,
                reason: error.to_string(),
            },
        }
    }

    pub fn decode(document: usize, error: &DecodeError) -> Self {
        Self {
            document: Some(document),
            severity: Severity::Warning,
            kind: DiagnosticKind::Decode {
                kind: error.kind().map(String::from),
                reason: error.to_string(),
            },
        }
    }

    pub fn unresolved_reference(target: ObjectKey) -> Self {
        Self {
            document: None,
            severity: Severity::Note,
            kind: DiagnosticKind::UnresolvedReference { target },
        }
    }

    /// One-line human readable description
    pub fn message(&self) -> String {
        let body = match &self.kind {
            DiagnosticKind::MalformedQuantity {
                object,
                container,
                field,
                value,
                reason,
            } => match container {
                Some(c) => format!(
                    "{object}: container {c}: {field} {value:?} treated as zero ({reason})"
                ),
                None => format!("{object}: {field} {value:?} treated as zero ({reason})"),
            },
            DiagnosticKind::Decode { kind, reason } => match kind {
                Some(k) => format!("skipped {k}: {reason}"),
                None => format!("skipped document: {reason}"),
            },
            DiagnosticKind::UnresolvedReference { target } => {
                format!("autoscaler target {target} not found in manifest; resources not applicable")
            }
        };

        match self.document {
            Some(doc) => format!("document {doc}: {body}"),
            None => body,
        }
    }
}

//! Estimator library for rendered Kubernetes manifests
//!
//! This crate provides the core functionality for:
//! - Parsing CPU and memory quantities into exact values
//! - Summing container requests and limits per pod template
//! - Reconciling workloads with their autoscalers, in any stream order
//! - Computing replica-scaled and cluster-wide totals

pub mod accumulator;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod models;
pub mod observability;
pub mod quantity;
pub mod registry;
pub mod totals;

pub use engine::{estimate_file, estimate_str, estimate_with, Estimate, ReconciliationEngine};
pub use error::{DecodeError, Diagnostic, DiagnosticKind, EstimateError, QuantityError, Severity};
pub use manifest::{ManifestDecoder, YamlDecoder};
pub use models::*;
pub use observability::{RunLogger, RunStats};
pub use quantity::{ResourceClass, ResourceQuantity};
pub use registry::{ObjectRecord, Registry};
pub use totals::{GrossTotals, RecordSummary, RecordTotals, ReplicaBasis, ReplicaScaled};

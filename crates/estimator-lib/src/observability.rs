//! Observability for estimation runs
//!
//! Provides:
//! - Per-run counters carried alongside the estimate
//! - Structured logging of run-level events with tracing

use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters for one run over a manifest stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub documents_seen: usize,
    pub empty_documents: usize,
    pub workloads: usize,
    pub autoscalers: usize,
    pub ignored: usize,
    pub decode_errors: usize,
    pub quantity_errors: usize,
}

impl RunStats {
    /// Documents that made it into the registry
    pub fn merged(&self) -> usize {
        self.workloads + self.autoscalers
    }
}

/// Structured logger for estimation events
///
/// Keeps event names and field keys consistent so JSON log output can be
/// filtered by `event`.
#[derive(Debug, Clone)]
pub struct RunLogger {
    source: String,
}

impl RunLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Log the start of a run
    pub fn log_started(&self, documents: usize) {
        info!(
            event = "estimate_started",
            source = %self.source,
            documents = documents,
            "Estimating manifest resources"
        );
    }

    /// Log a document that was classified and merged
    pub fn log_merged(&self, document: usize, kind: &str, name: &str) {
        debug!(
            event = "document_merged",
            source = %self.source,
            document = document,
            kind = %kind,
            name = %name,
            "Merged document into registry"
        );
    }

    /// Log a document that had no registry effect
    pub fn log_ignored(&self, document: usize, kind: Option<&str>) {
        debug!(
            event = "document_ignored",
            source = %self.source,
            document = document,
            kind = ?kind,
            "Document has no resource footprint"
        );
    }

    /// Log a document that could not be decoded
    pub fn log_skipped(&self, document: usize, reason: &str) {
        warn!(
            event = "document_skipped",
            source = %self.source,
            document = document,
            reason = %reason,
            "Skipping undecodable document"
        );
    }

    /// Log a container field that failed to parse
    pub fn log_malformed_quantity(&self, document: usize, object: &str, field: &str, value: &str) {
        warn!(
            event = "malformed_quantity",
            source = %self.source,
            document = document,
            object = %object,
            field = %field,
            value = %value,
            "Treating malformed quantity as zero"
        );
    }

    /// Log the end of a run
    pub fn log_completed(&self, records: usize, stats: &RunStats) {
        if stats.decode_errors + stats.quantity_errors > 0 {
            warn!(
                event = "estimate_completed",
                source = %self.source,
                records = records,
                decode_errors = stats.decode_errors,
                quantity_errors = stats.quantity_errors,
                "Estimate completed with diagnostics"
            );
        } else {
            info!(
                event = "estimate_completed",
                source = %self.source,
                records = records,
                documents = stats.documents_seen,
                "Estimate completed"
            );
        }
    }
}

//! Reconciliation engine
//!
//! Consumes a manifest stream one document at a time, strictly in order,
//! and merges workloads and autoscalers into a [`Registry`] owned by this
//! engine instance. Nothing is shared between runs: each run constructs,
//! mutates and discards its own engine.
//!
//! Errors never abort a run. A document that fails to decode is skipped, a
//! quantity that fails to parse counts as zero, and both are recorded as
//! diagnostics. Merged documents are never retracted.


use crate::accumulator;
use crate::error::{Diagnostic, EstimateError};
use crate::manifest::{split_documents, ManifestDecoder, RawDocument, YamlDecoder};
use crate::models::{AutoscalerObject, DecodedObject, WorkloadObject};
use crate::observability::{RunLogger, RunStats};
use crate::registry::Registry;
use crate::totals::{self, GrossTotals, RecordSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Finished result of one run, ready for presentation
#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    /// Records in first-seen order, with derived totals
    pub records: Vec<RecordSummary>,
    pub gross: GrossTotals,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: RunStats,
}

impl Estimate {
    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == crate::error::Severity::Warning)
    }
}

/// Single-pass engine over one manifest stream
pub struct ReconciliationEngine<D = YamlDecoder> {
    decoder: D,
    registry: Registry,
    diagnostics: Vec<Diagnostic>,
    stats: RunStats,
    logger: RunLogger,
}

impl ReconciliationEngine<YamlDecoder> {
    /// Engine using the default YAML decoder
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_decoder(YamlDecoder::default(), source)
    }
}

impl<D: ManifestDecoder> ReconciliationEngine<D> {
    pub fn with_decoder(decoder: D, source: impl Into<String>) -> Self {
        Self {
            decoder,
            registry: Registry::new(),
            diagnostics: Vec::new(),
            stats: RunStats::default(),
            logger: RunLogger::new(source),
        }
    }

    /// Split a whole stream and process every document in order
    pub fn ingest_stream(&mut self, content: &str) {
        let documents = split_documents(content);
        self.logger.log_started(documents.len());

        for document in &documents {
            self.ingest_document(document);
        }
    }

    /// Decode and apply one raw document. Blank documents have no effect.
    pub fn ingest_document(&mut self, document: &RawDocument) {
        self.stats.documents_seen += 1;

        if document.is_blank() {
            self.stats.empty_documents += 1;
            return;
        }

        match self.decoder.decode(&document.text) {
            Ok(decoded) => self.apply(document.index, decoded),
            Err(error) => {
                self.stats.decode_errors += 1;
                self.logger.log_skipped(document.index, &error.to_string());
                self.diagnostics.push(Diagnostic::decode(document.index, &error));
            }
        }
    }

    /// Dispatch an already decoded object by kind
    pub fn apply(&mut self, document: usize, decoded: DecodedObject) {
        match decoded {
            DecodedObject::Workload(workload) => self.apply_workload(document, workload),
            DecodedObject::Autoscaler(autoscaler) => self.apply_autoscaler(document, autoscaler),
            DecodedObject::Other { kind } => {
                self.stats.ignored += 1;
                self.logger.log_ignored(document, Some(&kind));
            }
        }
    }

    fn apply_workload(&mut self, document: usize, workload: WorkloadObject) {
        let key = workload.key();
        let accumulated = accumulator::accumulate(&workload.pod_template);

        for failure in accumulated.errors {
            self.stats.quantity_errors += 1;
            self.logger.log_malformed_quantity(
                document,
                &key.to_string(),
                &failure.field.to_string(),
                &failure.value,
            );
            self.diagnostics.push(Diagnostic::malformed_quantity(
                document,
                key.clone(),
                failure.container,
                failure.field,
                failure.value,
                &failure.error,
            ));
        }

        self.stats.workloads += 1;
        self.registry.upsert_workload(
            &workload.kind,
            &workload.name,
            accumulated.totals,
            workload.static_replicas,
        );
        self.logger.log_merged(document, &key.kind, &key.name);
    }

    fn apply_autoscaler(&mut self, document: usize, autoscaler: AutoscalerObject) {
        self.stats.autoscalers += 1;
        self.registry.upsert_autoscaler_bounds(
            &autoscaler.target_kind,
            &autoscaler.target_name,
            autoscaler.min_replicas,
            autoscaler.max_replicas,
        );
        self.logger
            .log_merged(document, &autoscaler.target_kind, &autoscaler.target_name);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// End of stream: hand the registry to the totals pass
    pub fn finish(self) -> Estimate {
        let mut diagnostics = self.diagnostics;
        diagnostics.extend(
            self.registry
                .iter()
                .filter(|record| record.is_unresolved())
                .map(|record| Diagnostic::unresolved_reference(record.key())),
        );

        let (records, gross) = totals::compute(self.registry.into_records());
        self.logger.log_completed(records.len(), &self.stats);

        Estimate {
            source: self.logger.source().to_string(),
            generated_at: Utc::now(),
            records,
            gross,
            diagnostics,
            stats: self.stats,
        }
    }
}

/// Estimate a manifest stream held in memory
pub fn estimate_str(content: &str, source: &str) -> Estimate {
    estimate_with(YamlDecoder::default(), content, source)
}

/// Estimate a manifest stream with a specific decoder
pub fn estimate_with<D: ManifestDecoder>(decoder: D, content: &str, source: &str) -> Estimate {
    let mut engine = ReconciliationEngine::with_decoder(decoder, source);
    engine.ingest_stream(content);
    engine.finish()
}

/// Read and estimate a manifest file
pub fn estimate_file<D: ManifestDecoder>(decoder: D, path: &Path) -> Result<Estimate, EstimateError> {
    let content = std::fs::read_to_string(path).map_err(|source| EstimateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(estimate_with(decoder, &content, &path.display().to_string()))
}

//! The `estimate` command

use anyhow::{Context, Result};
use estimator_lib::{
    estimate_file, estimate_with, Estimate, GrossTotals, PodResources, RecordSummary,
    ReplicaBasis, ResourceField, Severity, YamlDecoder,
};
use std::path::{Path, PathBuf};
use tabled::Tabled;

use crate::output::{
    format_count, format_optional, format_quantity, print_info, print_success, print_warning,
    OutputFormat,
};

/// Path value that reads the manifest from standard input
pub const STDIN_PATH: &str = "-";

/// Resolved options for one estimate run
#[derive(Debug, Clone)]
pub struct EstimateOptions {
    pub path: PathBuf,
    pub verbosity: u8,
    pub workload_kinds: Vec<String>,
    pub format: OutputFormat,
}

/// Row for the verbosity 0 table
#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "CPU Req")]
    cpu_request: String,
    #[tabled(rename = "CPU Lim")]
    cpu_limit: String,
    #[tabled(rename = "Mem Req")]
    memory_request: String,
    #[tabled(rename = "Mem Lim")]
    memory_limit: String,
}

/// Row for the verbosity 1 table
#[derive(Tabled)]
struct ReplicaRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Replicas")]
    replicas: String,
    #[tabled(rename = "CPU Req")]
    cpu_request: String,
    #[tabled(rename = "CPU Lim")]
    cpu_limit: String,
    #[tabled(rename = "Mem Req")]
    memory_request: String,
    #[tabled(rename = "Mem Lim")]
    memory_limit: String,
}

/// Row for the verbosity 2 table
#[derive(Tabled)]
struct ScaledRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Replicas")]
    replicas: String,
    #[tabled(rename = "HPA Min")]
    min_replicas: String,
    #[tabled(rename = "HPA Max")]
    max_replicas: String,
    #[tabled(rename = "CPU Req")]
    cpu_request: String,
    #[tabled(rename = "CPU Lim")]
    cpu_limit: String,
    #[tabled(rename = "Mem Req")]
    memory_request: String,
    #[tabled(rename = "Mem Lim")]
    memory_limit: String,
    #[tabled(rename = "CPU Req (rep/min/max)")]
    scaled_cpu_request: String,
    #[tabled(rename = "CPU Lim (rep/min/max)")]
    scaled_cpu_limit: String,
    #[tabled(rename = "Mem Req (rep/min/max)")]
    scaled_memory_request: String,
    #[tabled(rename = "Mem Lim (rep/min/max)")]
    scaled_memory_limit: String,
}

/// Row for the gross totals table
#[derive(Tabled)]
struct GrossRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "At Replicas")]
    at_replicas: String,
    #[tabled(rename = "At HPA Min")]
    at_min: String,
    #[tabled(rename = "At HPA Max")]
    at_max: String,
}

/// Run an estimate and print the report
pub fn run_estimate(options: &EstimateOptions) -> Result<()> {
    let decoder = YamlDecoder::with_workload_kinds(&options.workload_kinds);
    let estimate = load_estimate(decoder, &options.path)?;

    match options.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&estimate)?;
            println!("{}", json);
        }
        OutputFormat::Table => print_report(&estimate, options.verbosity),
    }

    Ok(())
}

fn load_estimate(decoder: YamlDecoder, path: &Path) -> Result<Estimate> {
    if path == Path::new(STDIN_PATH) {
        let content = std::io::read_to_string(std::io::stdin())
            .context("Failed to read manifest from stdin")?;
        return Ok(estimate_with(decoder, &content, "<stdin>"));
    }

    estimate_file(decoder, path).with_context(|| format!("Cannot estimate {}", path.display()))
}

fn print_report(estimate: &Estimate, verbosity: u8) {
    if estimate.records.is_empty() {
        print_warning(&format!("No workloads found in {}", estimate.source));
    } else {
        println!("{}", render_records(&estimate.records, verbosity));
    }

    println!("\nGross totals:");
    println!("{}", render_gross(&estimate.gross));

    if estimate.diagnostics.is_empty() {
        print_success(&format!(
            "{} objects estimated from {} documents",
            estimate.records.len(),
            estimate.stats.documents_seen
        ));
        return;
    }

    println!();
    for diagnostic in &estimate.diagnostics {
        match diagnostic.severity {
            Severity::Warning => print_warning(&diagnostic.message()),
            Severity::Note => print_info(&diagnostic.message()),
        }
    }
}

/// Render the per-object table for a verbosity tier
pub fn render_records(records: &[RecordSummary], verbosity: u8) -> String {
    let mut table = match verbosity {
        0 => tabled::Table::new(records.iter().map(pod_row)),
        1 => tabled::Table::new(records.iter().map(replica_row)),
        _ => tabled::Table::new(records.iter().map(scaled_row)),
    };

    table.with(tabled::settings::Style::rounded()).to_string()
}

/// Render the gross totals table
pub fn render_gross(gross: &GrossTotals) -> String {
    let rows = ResourceField::ALL.iter().map(|&field| {
        let scaled = gross.get(field);
        GrossRow {
            resource: field_label(field).to_string(),
            at_replicas: format_quantity(&scaled.at_replicas),
            at_min: format_quantity(&scaled.at_min),
            at_max: format_quantity(&scaled.at_max),
        }
    });

    tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string()
}

fn field_label(field: ResourceField) -> &'static str {
    match field {
        ResourceField::CpuRequest => "CPU Request",
        ResourceField::CpuLimit => "CPU Limit",
        ResourceField::MemoryRequest => "Memory Request",
        ResourceField::MemoryLimit => "Memory Limit",
    }
}

fn per_pod(summary: &RecordSummary, field: ResourceField) -> String {
    format_optional(summary.record.resources.map(|r| r.get(field)).as_ref())
}

fn pod_row(summary: &RecordSummary) -> PodRow {
    PodRow {
        kind: summary.record.kind.clone(),
        name: summary.record.name.clone(),
        cpu_request: per_pod(summary, ResourceField::CpuRequest),
        cpu_limit: per_pod(summary, ResourceField::CpuLimit),
        memory_request: per_pod(summary, ResourceField::MemoryRequest),
        memory_limit: per_pod(summary, ResourceField::MemoryLimit),
    }
}

fn replica_row(summary: &RecordSummary) -> ReplicaRow {
    ReplicaRow {
        kind: summary.record.kind.clone(),
        name: summary.record.name.clone(),
        replicas: format_count(summary.record.replicas),
        cpu_request: per_pod(summary, ResourceField::CpuRequest),
        cpu_limit: per_pod(summary, ResourceField::CpuLimit),
        memory_request: per_pod(summary, ResourceField::MemoryRequest),
        memory_limit: per_pod(summary, ResourceField::MemoryLimit),
    }
}

fn scaled_row(summary: &RecordSummary) -> ScaledRow {
    let scaled = |field: ResourceField| {
        ReplicaBasis::ALL
            .iter()
            .map(|&basis| {
                let vector: Option<&PodResources> = summary.totals.get(basis);
                format_optional(vector.map(|v| v.get(field)).as_ref())
            })
            .collect::<Vec<_>>()
            .join(" / ")
    };

    ScaledRow {
        kind: summary.record.kind.clone(),
        name: summary.record.name.clone(),
        replicas: format_count(summary.record.replicas),
        min_replicas: format_count(summary.record.min_replicas),
        max_replicas: format_count(summary.record.max_replicas),
        cpu_request: per_pod(summary, ResourceField::CpuRequest),
        cpu_limit: per_pod(summary, ResourceField::CpuLimit),
        memory_request: per_pod(summary, ResourceField::MemoryRequest),
        memory_limit: per_pod(summary, ResourceField::MemoryLimit),
        scaled_cpu_request: scaled(ResourceField::CpuRequest),
        scaled_cpu_limit: scaled(ResourceField::CpuLimit),
        scaled_memory_request: scaled(ResourceField::MemoryRequest),
        scaled_memory_limit: scaled(ResourceField::MemoryLimit),
    }
}

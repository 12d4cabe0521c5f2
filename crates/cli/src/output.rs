//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use estimator_lib::ResourceQuantity;
use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Format for log lines written to stderr
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Shown wherever a value does not apply
pub const NOT_APPLICABLE: &str = "NA";

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format bytes as human-readable string with binary units
pub fn format_bytes(bytes: u128) -> String {
    const UNITS: [&str; 7] = ["B", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{}B", bytes)
    } else {
        format!("{:.3}{}", value, UNITS[unit])
    }
}

/// Format a quantity for display: CPU as decimal cores, memory in binary units
pub fn format_quantity(quantity: &ResourceQuantity) -> String {
    match quantity.class() {
        estimator_lib::ResourceClass::Cpu => quantity.to_string(),
        estimator_lib::ResourceClass::Memory => format_bytes(quantity.base_units()),
    }
}

/// Format an optional quantity, `NA` when not applicable
pub fn format_optional(quantity: Option<&ResourceQuantity>) -> String {
    quantity
        .map(format_quantity)
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

/// Format an optional replica count
pub fn format_count(count: Option<u32>) -> String {
    count
        .map(|c| c.to_string())
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

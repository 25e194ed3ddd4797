//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use forecast_lib::{ComponentStatus, RiskLevel};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message to stderr
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message to stderr
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a severity on the 0-10 scale
pub fn format_severity(severity: f64) -> String {
    format!("{:.1}", severity)
}

/// Format a unix timestamp as UTC
pub fn format_timestamp(ts: i64) -> String {
    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Color a risk tier
pub fn color_risk(risk: RiskLevel) -> String {
    match risk {
        RiskLevel::Low => risk.as_str().green().to_string(),
        RiskLevel::Moderate => risk.as_str().yellow().to_string(),
        RiskLevel::High => risk.as_str().red().bold().to_string(),
    }
}

/// Color a component status
pub fn color_status(status: ComponentStatus) -> String {
    match status {
        ComponentStatus::Healthy => "healthy".green().to_string(),
        ComponentStatus::Degraded => "degraded".yellow().to_string(),
        ComponentStatus::Unhealthy => "unhealthy".red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_severity() {
        assert_eq!(format_severity(11.0), "11.0");
        assert_eq!(format_severity(3.25), "3.2");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1714521600), "2024-05-01 00:00:00");
    }

    #[test]
    fn test_colored_labels_keep_text() {
        assert!(color_risk(RiskLevel::High).contains("High"));
        assert!(color_status(ComponentStatus::Degraded).contains("degraded"));
    }
}

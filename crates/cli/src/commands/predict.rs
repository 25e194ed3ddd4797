//! Forecast commands

use anyhow::{Context, Result};
use colored::Colorize;
use forecast_lib::{EngineConfig, PredictionEngine, PredictionResult, RawLog, StrategyKind};
use serde_json::Value;
use std::path::Path;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_risk, format_severity, print_info, print_json, print_warning, OutputFormat,
};

/// Row for the forecast table
#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Predicted Severity")]
    predicted_severity: String,
    #[tabled(rename = "Risk")]
    risk_level: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
}

/// Where the forecast is computed
pub enum Target<'a> {
    Local(StrategyKind),
    Remote(&'a ApiClient),
}

/// Read a JSON array of daily logs from disk
pub fn load_logs(path: &Path) -> Result<Vec<RawLog>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read log file {}", path.display()))?;

    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;

    match value {
        Value::Array(logs) => Ok(logs),
        _ => anyhow::bail!("{} must contain a JSON array of daily logs", path.display()),
    }
}

/// Evaluate a history in-process
pub fn predict_local(logs: &[RawLog], strategy: StrategyKind, verbose: bool) -> Result<PredictionResult> {
    let engine = PredictionEngine::new(EngineConfig::for_strategy(strategy));
    if verbose {
        print_info(&format!(
            "Evaluating {} records with the {} strategy",
            logs.len(),
            strategy
        ));
    }

    let outcome = engine.run(logs).context("Prediction failed")?;

    if verbose && outcome.is_fallback() {
        print_warning(&format!(
            "Fewer than {} records, showing the default forecast",
            engine.min_records()
        ));
    }
    Ok(outcome.result)
}

/// Run `carecast predict`
pub async fn predict(
    file: &Path,
    target: Target<'_>,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let logs = load_logs(file)?;

    let result = match target {
        Target::Local(strategy) => predict_local(&logs, strategy, verbose)?,
        Target::Remote(client) => {
            if verbose {
                print_info(&format!(
                    "Submitting {} records to {}",
                    logs.len(),
                    client.base_url()
                ));
            }
            client.predict(&logs).await?
        }
    };

    print_prediction(&result, format)
}

fn print_prediction(result: &PredictionResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(result)?,
        OutputFormat::Table => {
            println!("{}", "Severity Forecast".bold());
            let row = PredictionRow {
                predicted_severity: format_severity(result.predicted_severity),
                risk_level: color_risk(result.risk_level),
                recommendation: result.recommendation.clone(),
            };
            let table = tabled::Table::new([row])
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_lib::RiskLevel;
    use std::io::Write;

    fn write_logs(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_logs_reads_array() {
        let file = write_logs(r#"[{"checkin_date": "2024-05-01", "severity_rating": 3}]"#);
        let logs = load_logs(file.path()).unwrap();
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn test_load_logs_rejects_object() {
        let file = write_logs(r#"{"severity_rating": 3}"#);
        let err = load_logs(file.path()).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }

    #[test]
    fn test_load_logs_missing_file() {
        assert!(load_logs(Path::new("/nonexistent/carecast/logs.json")).is_err());
    }

    #[test]
    fn test_predict_local_trend() {
        let file = write_logs(
            r#"[
                {"checkin_date": "2024-05-01", "severity_rating": 3, "nap_count": 1, "is_emergency": false},
                {"checkin_date": "2024-05-02", "severity_rating": 4, "nap_count": 1, "is_emergency": false},
                {"checkin_date": "2024-05-03", "severity_rating": 5, "nap_count": 1, "is_emergency": false},
                {"checkin_date": "2024-05-04", "severity_rating": 9, "nap_count": 1, "is_emergency": true}
            ]"#,
        );
        let logs = load_logs(file.path()).unwrap();
        let result = predict_local(&logs, StrategyKind::Trend, false).unwrap();
        assert_eq!(result.predicted_severity, 11.0);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_predict_local_malformed() {
        let logs = vec![
            serde_json::json!({"checkin_date": "2024-05-01", "severity_rating": 3, "nap_count": 1, "is_emergency": false}),
            serde_json::json!({"checkin_date": "2024-05-02", "severity_rating": "high", "nap_count": 1, "is_emergency": false}),
        ];
        let err = predict_local(&logs, StrategyKind::Trend, false).unwrap_err();
        assert!(format!("{:#}", err).contains("severity_rating"));
    }
}

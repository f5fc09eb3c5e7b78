//! Run command implementation.

use crate::config::Config;
use crate::suppliers;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use supplydemand_engine::{Engine, MetricsSnapshot};

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// JSON payload overriding the configured one
    pub payload: Option<String>,
    /// Print per-capability metrics to stderr
    pub stats: bool,
    /// Pretty-print the result
    pub pretty: bool,
}

/// Resolve the configured root and print its result as JSON
pub async fn run_config(config_path: &Path, opts: RunOptions) -> Result<()> {
    tracing::info!("Loading config from {:?}", config_path);
    let mut config = Config::from_file(config_path).context("Failed to load configuration")?;

    let payload = match &opts.payload {
        Some(raw) => serde_json::from_str(raw).context("--payload is not valid JSON")?,
        None => config.payload.clone(),
    };
    if opts.stats {
        config.engine.collect_metrics = true;
    }

    let (result, metrics) = execute(&config, payload).await?;

    let rendered = if opts.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", rendered);

    if opts.stats {
        for snapshot in metrics {
            eprint!("{}", snapshot);
        }
    }
    Ok(())
}

/// Build the registry, run the root, and collect metrics if enabled
pub async fn execute(config: &Config, payload: Value) -> Result<(Value, Vec<MetricsSnapshot>)> {
    let registry = suppliers::registry(&config.suppliers);
    let root = suppliers::build(&config.root);
    let engine = Engine::new(config.engine.clone());

    tracing::info!(suppliers = registry.len(), "Resolving root");
    let result = engine
        .init(root, registry, payload)
        .await
        .context("Root demand failed")?;

    let metrics = engine
        .metrics()
        .map(|metrics| metrics.snapshot())
        .unwrap_or_default();
    Ok((result, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_execute_collects_metrics() {
        let config = Config::from_yaml(
            r#"
root: { kind: sum, of: [first, second] }
engine: { collect_metrics: true }
suppliers:
  first: { kind: value, value: 10 }
  second: { kind: value, value: 32 }
"#,
        )
        .unwrap();

        let (result, metrics) = execute(&config, Value::Null).await.unwrap();
        assert_eq!(result, json!(42));

        let names: Vec<&str> = metrics.iter().map(|m| m.capability.as_str()).collect();
        assert_eq!(names, vec!["$$root", "first", "second"]);
    }

    #[tokio::test]
    async fn test_execute_reports_missing_supplier() {
        let config = Config::from_yaml("root: { kind: demand, type: missing }").unwrap();

        let err = execute(&config, Value::Null).await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Root demand failed"));
        assert!(message.contains("Supplier not found for type: missing"));
    }

    #[tokio::test]
    async fn test_execute_passes_payload_without_metrics() {
        let config = Config::from_yaml(
            r#"
root: { kind: demand, type: echo }
suppliers:
  echo: { kind: payload }
"#,
        )
        .unwrap();

        let (result, metrics) = execute(&config, json!({ "n": 1 })).await.unwrap();
        assert_eq!(result, json!({ "n": 1 }));
        assert!(metrics.is_empty());
    }
}

//! List command implementation.

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Print the capabilities declared in the base registry
pub fn list_suppliers(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;

    if json {
        let entries: Vec<_> = config
            .suppliers
            .iter()
            .map(|(name, spec)| serde_json::json!({ "name": name, "kind": spec.kind() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (name, spec) in &config.suppliers {
        println!("{}\t{}", name, spec.kind());
    }
    Ok(())
}

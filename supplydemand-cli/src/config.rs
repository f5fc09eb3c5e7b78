//! Configuration parsing for declared suppliers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use supplydemand_engine::{EngineConfig, ROOT_CAPABILITY};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid supplier `{name}`: {reason}")]
    InvalidSupplier { name: String, reason: String },
}

/// Main configuration struct matching supplydemand.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Supplier invoked by reference as the root of the demand chain
    pub root: SupplierSpec,

    /// Payload handed to the root when `--payload` is not given
    #[serde(default)]
    pub payload: Value,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Base registry, keyed by capability name
    #[serde(default)]
    pub suppliers: BTreeMap<String, SupplierSpec>,
}

/// Declarative description of a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SupplierSpec {
    /// Constant value
    Value { value: Value },

    /// Echo the payload
    Payload,

    /// The scope's demand path, as JSON
    Path,

    /// Demand each capability in order and add the numeric results
    Sum { of: Vec<String> },

    /// Demand each capability concurrently and collect the results
    Collect { of: Vec<String> },

    /// Forward to another capability
    Demand {
        #[serde(rename = "type")]
        capability: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,

        /// Payload for the nested demand; the incoming payload when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,

        #[serde(default)]
        clear: bool,

        #[serde(default)]
        remove: Vec<String>,

        #[serde(default)]
        add: BTreeMap<String, SupplierSpec>,
    },

    /// Demand a capability, substituting `default` if it is not registered
    Fallback {
        #[serde(rename = "type")]
        capability: String,
        default: Value,
    },

    /// Sleep, then behave like `then`
    Delay { ms: u64, then: Box<SupplierSpec> },
}

impl SupplierSpec {
    /// Short name of the declaration kind
    pub fn kind(&self) -> &'static str {
        match self {
            SupplierSpec::Value { .. } => "value",
            SupplierSpec::Payload => "payload",
            SupplierSpec::Path => "path",
            SupplierSpec::Sum { .. } => "sum",
            SupplierSpec::Collect { .. } => "collect",
            SupplierSpec::Demand { .. } => "demand",
            SupplierSpec::Fallback { .. } => "fallback",
            SupplierSpec::Delay { .. } => "delay",
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidSupplier {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        match self {
            SupplierSpec::Sum { of } | SupplierSpec::Collect { of } => {
                if of.is_empty() {
                    return Err(invalid("`of` must name at least one capability"));
                }
                if of.iter().any(|n| n.is_empty()) {
                    return Err(invalid("capability names must not be empty"));
                }
            }
            SupplierSpec::Demand {
                capability, add, ..
            } => {
                if capability.is_empty() {
                    return Err(invalid("`type` must not be empty"));
                }
                for (added, spec) in add {
                    validate_name(added)?;
                    spec.validate(added)?;
                }
            }
            SupplierSpec::Fallback { capability, .. } if capability.is_empty() => {
                return Err(invalid("`type` must not be empty"));
            }
            SupplierSpec::Delay { then, .. } => then.validate(name)?,
            _ => {}
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::InvalidSupplier {
            name: name.to_string(),
            reason: "capability names must not be empty".to_string(),
        });
    }
    if name == ROOT_CAPABILITY {
        return Err(ConfigError::InvalidSupplier {
            name: name.to_string(),
            reason: "name is reserved for the root supplier".to_string(),
        });
    }
    Ok(())
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks; references between suppliers are resolved at
    /// demand time because an override may add them
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.root.validate(ROOT_CAPABILITY)?;
        for (name, spec) in &self.suppliers {
            validate_name(name)?;
            spec.validate(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_kinds() {
        let config = Config::from_yaml(
            r#"
root:
  kind: demand
  type: total
  key: main
  data: { scale: 2 }
  clear: false
  remove: [stale]
  add:
    extra: { kind: payload }
suppliers:
  one: { kind: value, value: 1 }
  echo: { kind: payload }
  where: { kind: path }
  total: { kind: sum, of: [one, one] }
  both: { kind: collect, of: [one, echo] }
  safe: { kind: fallback, type: nope, default: 0 }
  slow:
    kind: delay
    ms: 5
    then: { kind: value, value: late }
"#,
        )
        .unwrap();

        assert_eq!(config.payload, Value::Null);
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.suppliers.len(), 7);
        assert_eq!(config.suppliers["safe"].kind(), "fallback");
        assert_eq!(
            config.suppliers["total"],
            SupplierSpec::Sum {
                of: vec!["one".into(), "one".into()]
            }
        );
        match &config.root {
            SupplierSpec::Demand {
                capability,
                key,
                data,
                remove,
                add,
                ..
            } => {
                assert_eq!(capability, "total");
                assert_eq!(key.as_deref(), Some("main"));
                assert_eq!(data, &Some(serde_json::json!({ "scale": 2 })));
                assert_eq!(remove, &vec!["stale".to_string()]);
                assert_eq!(add["extra"], SupplierSpec::Payload);
            }
            other => panic!("unexpected root: {:?}", other),
        }
    }

    #[test]
    fn test_engine_section() {
        let config = Config::from_yaml(
            r#"
root: { kind: value, value: 1 }
engine:
  register_root: true
"#,
        )
        .unwrap();

        assert!(config.engine.register_root);
        assert!(!config.engine.collect_metrics);
        assert!(config.suppliers.is_empty());
    }

    #[test]
    fn test_reserved_name_rejected() {
        let err = Config::from_yaml(
            r#"
root: { kind: payload }
suppliers:
  "$$root": { kind: value, value: 1 }
"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidSupplier { ref name, .. } if name == "$$root"));
    }

    #[test]
    fn test_empty_sum_rejected() {
        let err = Config::from_yaml(
            r#"
root: { kind: sum, of: [] }
"#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid supplier `$$root`: `of` must name at least one capability"
        );
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let err = Config::from_yaml("root: { kind: teleport }").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }
}

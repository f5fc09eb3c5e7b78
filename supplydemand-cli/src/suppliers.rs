//! Turns supplier declarations into engine suppliers.

use crate::config::SupplierSpec;
use anyhow::{anyhow, Context};
use futures::future::try_join_all;
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use supplydemand_engine::{DemandRequest, DynRegistry, DynScope, DynSupplier, RegistryOverride, Supplier};

/// Build the base registry from the `suppliers` section
pub fn registry(specs: &BTreeMap<String, SupplierSpec>) -> DynRegistry {
    specs
        .iter()
        .map(|(name, spec)| (name.clone(), build(spec)))
        .collect()
}

/// Build one supplier from its declaration
pub fn build(spec: &SupplierSpec) -> DynSupplier {
    match spec {
        SupplierSpec::Value { value } => Supplier::value(value.clone()),

        SupplierSpec::Payload => Supplier::from_fn(|data, _| Ok(data)),

        SupplierSpec::Path => Supplier::from_fn(|_, scope: &DynScope| {
            Ok(serde_json::to_value(scope.path()).context("failed to encode demand path")?)
        }),

        SupplierSpec::Sum { of } => {
            let of = of.clone();
            Supplier::new(move |data: Value, scope: DynScope| {
                let of = of.clone();
                async move {
                    let mut values = Vec::with_capacity(of.len());
                    for name in of {
                        let request = DemandRequest::with_data(name, data.clone());
                        values.push(scope.demand(request).await?);
                    }
                    Ok(add_numbers(&values)?)
                }
            })
        }

        SupplierSpec::Collect { of } => {
            let of = of.clone();
            Supplier::new(move |data: Value, scope: DynScope| {
                let pending: Vec<_> = of
                    .iter()
                    .map(|name| scope.demand(DemandRequest::with_data(name.clone(), data.clone())))
                    .collect();
                async move { Ok(Value::Array(try_join_all(pending).await?)) }
            })
        }

        SupplierSpec::Demand {
            capability,
            key,
            data,
            clear,
            remove,
            add,
        } => {
            let overrides = build_override(*clear, remove, add);
            let capability = capability.clone();
            let key = key.clone();
            let fixed_data = data.clone();

            Supplier::new(move |data: Value, scope: DynScope| {
                let mut request =
                    DemandRequest::with_data(capability.clone(), fixed_data.clone().unwrap_or(data));
                if let Some(key) = &key {
                    request = request.key(key.clone());
                }
                if let Some(overrides) = &overrides {
                    request = request.overrides(overrides.clone());
                }
                scope.demand(request)
            })
        }

        SupplierSpec::Fallback {
            capability,
            default,
        } => {
            let capability = capability.clone();
            let default = default.clone();

            Supplier::new(move |data: Value, scope: DynScope| {
                let pending = scope.demand(DemandRequest::with_data(capability.clone(), data));
                let default = default.clone();
                // only a miss of the demanded capability itself, not one further down
                let direct = scope.depth() + 1;
                async move {
                    match pending.await {
                        Err(err) if err.missing_path().map(|path| path.len()) == Some(direct) => {
                            tracing::debug!(error = %err, "Using fallback value");
                            Ok(default)
                        }
                        other => other,
                    }
                }
            })
        }

        SupplierSpec::Delay { ms, then } => {
            let delay = Duration::from_millis(*ms);
            let inner = build(then);

            Supplier::new(move |data: Value, scope: DynScope| {
                let inner = inner.clone();
                async move {
                    tokio::time::sleep(delay).await;
                    inner.call(data, scope).await
                }
            })
        }
    }
}

fn build_override(
    clear: bool,
    remove: &[String],
    add: &BTreeMap<String, SupplierSpec>,
) -> Option<RegistryOverride<Value, Value>> {
    let mut overrides = RegistryOverride::new();
    if clear {
        overrides = overrides.clear();
    }
    for name in remove {
        overrides = overrides.remove(name.clone());
    }
    for (name, spec) in add {
        overrides = overrides.add(name.clone(), build(spec));
    }
    (!overrides.is_noop()).then_some(overrides)
}

/// Add JSON numbers, staying integral while every operand is an integer
fn add_numbers(values: &[Value]) -> anyhow::Result<Value> {
    let mut int_total: Option<i64> = Some(0);
    let mut float_total = 0.0;

    for value in values {
        let number = value
            .as_number()
            .ok_or_else(|| anyhow!("cannot add non-numeric value {}", value))?;
        float_total += number.as_f64().unwrap_or(f64::NAN);
        int_total = match (int_total, number.as_i64()) {
            (Some(total), Some(n)) => total.checked_add(n),
            _ => None,
        };
    }

    match int_total {
        Some(total) => Ok(Value::from(total)),
        None => Number::from_f64(float_total)
            .map(Value::Number)
            .ok_or_else(|| anyhow!("sum is not a finite number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use supplydemand_engine::init;

    fn spec(yaml: &str) -> SupplierSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn specs(yaml: &str) -> BTreeMap<String, SupplierSpec> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_add_numbers() {
        assert_eq!(add_numbers(&[json!(10), json!(32)]).unwrap(), json!(42));
        assert_eq!(add_numbers(&[json!(1), json!(0.5)]).unwrap(), json!(1.5));
        assert_eq!(add_numbers(&[]).unwrap(), json!(0));
        assert!(add_numbers(&[json!(1), json!("two")]).is_err());
    }

    #[tokio::test]
    async fn test_sum_of_declared_values() {
        let registry = registry(&specs(
            r#"
first: { kind: value, value: 10 }
second: { kind: value, value: 32 }
"#,
        ));
        let root = build(&spec("{ kind: sum, of: [first, second] }"));

        assert_eq!(init(root, registry).await.unwrap(), json!(42));
    }

    #[tokio::test]
    async fn test_collect_preserves_order() {
        let registry = registry(&specs(
            r#"
slow: { kind: delay, ms: 20, then: { kind: value, value: a } }
fast: { kind: value, value: b }
"#,
        ));
        let root = build(&spec("{ kind: collect, of: [slow, fast] }"));

        assert_eq!(init(root, registry).await.unwrap(), json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_demand_override_replaces_number() {
        let registry = registry(&specs("number: { kind: value, value: 123 }"));
        let root = build(&spec(
            r#"
kind: collect
of: [number, swapped]
"#,
        ));
        let registry = {
            let mut registry = registry;
            registry.insert(
                "swapped",
                build(&spec(
                    r#"
kind: demand
type: number
remove: [number]
add:
  number: { kind: value, value: 999 }
"#,
                )),
            );
            registry
        };

        assert_eq!(init(root, registry).await.unwrap(), json!([123, 999]));
    }

    #[tokio::test]
    async fn test_demand_key_and_path() {
        let registry = registry(&specs("where: { kind: path }"));
        let root = build(&spec("{ kind: demand, type: where, key: here }"));

        assert_eq!(
            init(root, registry).await.unwrap(),
            json!([{ "key": "here", "type": "where" }])
        );
    }

    #[tokio::test]
    async fn test_demand_fixed_data_and_payload_echo() {
        let registry = registry(&specs("echo: { kind: payload }"));
        let root = build(&spec("{ kind: demand, type: echo, data: { n: 1 } }"));

        assert_eq!(init(root, registry).await.unwrap(), json!({ "n": 1 }));
    }

    #[tokio::test]
    async fn test_fallback_only_catches_missing() {
        let registry = registry(&specs(
            r#"
bad: { kind: sum, of: [text] }
text: { kind: value, value: nope }
"#,
        ));

        let missing = build(&spec("{ kind: fallback, type: absent, default: 7 }"));
        assert_eq!(init(missing, registry.clone()).await.unwrap(), json!(7));

        let failing = build(&spec("{ kind: fallback, type: bad, default: 7 }"));
        let err = init(failing, registry).await.unwrap_err();
        assert!(!err.is_supplier_not_found());
    }

    #[tokio::test]
    async fn test_fallback_reports_nested_misses() {
        let registry = registry(&specs("outer: { kind: demand, type: inner }"));
        let root = build(&spec("{ kind: fallback, type: outer, default: 7 }"));

        let err = init(root, registry).await.unwrap_err();
        assert_eq!(err.missing_capability(), Some("inner"));
        assert_eq!(err.missing_path().map(|path| path.len()), Some(2));
    }

    #[tokio::test]
    async fn test_clear_hides_base_registry() {
        let registry = registry(&specs("first: { kind: value, value: 1 }"));
        let root = build(&spec(
            r#"
kind: demand
type: first
clear: true
"#,
        ));

        let err = init(root, registry).await.unwrap_err();
        assert_eq!(err.missing_capability(), Some("first"));
    }
}

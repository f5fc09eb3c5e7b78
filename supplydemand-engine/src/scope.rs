//! Scopes and demand requests
//!
//! Every invoked supplier receives a [`Scope`]: its own identity, the path
//! that led to it, the registry it can see, and `demand`, which resolves a
//! further capability against that registry (optionally overridden for the
//! nested subtree only).

use crate::engine::{self, Resolution};
use crate::error::Result;
use crate::metrics::DemandMetrics;
use crate::registry::{Registry, RegistryOverride};
use crate::supplier::SupplyFuture;
use std::fmt;
use std::sync::Arc;
use supplydemand_types::{DemandPath, PathSegment};

/// Arguments of a single nested demand
pub struct DemandRequest<D, R> {
    /// Capability to resolve
    pub capability: String,

    /// Identity label; the capability name is used when absent or empty
    pub key: Option<String>,

    /// Payload handed to the supplier
    pub data: D,

    /// Registry changes visible to this demand's subtree only
    pub overrides: Option<RegistryOverride<D, R>>,
}

impl<D, R> DemandRequest<D, R> {
    pub fn with_data(capability: impl Into<String>, data: D) -> Self {
        DemandRequest {
            capability: capability.into(),
            key: None,
            data,
            overrides: None,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn data(mut self, data: D) -> Self {
        self.data = data;
        self
    }

    pub fn overrides(mut self, overrides: RegistryOverride<D, R>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// The key this demand will be recorded under
    pub fn resolved_key(&self) -> &str {
        match self.key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => &self.capability,
        }
    }
}

impl<D: Default, R> DemandRequest<D, R> {
    /// Demand `capability` with a default payload
    pub fn new(capability: impl Into<String>) -> Self {
        Self::with_data(capability, D::default())
    }
}

impl<D: fmt::Debug, R> fmt::Debug for DemandRequest<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemandRequest")
            .field("capability", &self.capability)
            .field("key", &self.key)
            .field("data", &self.data)
            .field("overrides", &self.overrides)
            .finish()
    }
}

/// Context handed to an invoked supplier
pub struct Scope<D, R> {
    key: String,
    capability: String,
    path: DemandPath,
    registry: Registry<D, R>,
    pub(crate) metrics: Option<Arc<DemandMetrics>>,
}

impl<D, R> Scope<D, R> {
    pub(crate) fn new(
        key: String,
        capability: String,
        path: DemandPath,
        registry: Registry<D, R>,
        metrics: Option<Arc<DemandMetrics>>,
    ) -> Self {
        Scope {
            key,
            capability,
            path,
            registry,
            metrics,
        }
    }

    /// Identity label this supplier was demanded under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Capability name this supplier was resolved for
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Demands taken from the root to reach this scope
    pub fn path(&self) -> &DemandPath {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Registry nested demands resolve against
    pub fn registry(&self) -> &Registry<D, R> {
        &self.registry
    }
}

impl<D, R> Scope<D, R>
where
    D: Send + 'static,
    R: Send + 'static,
{
    /// Resolve a nested capability
    ///
    /// The returned future owns everything it needs, so siblings may be
    /// joined or spawned concurrently.
    pub fn demand(&self, request: DemandRequest<D, R>) -> SupplyFuture<R> {
        let key = request.resolved_key().to_owned();
        let DemandRequest {
            capability,
            data,
            overrides,
            ..
        } = request;

        let registry = match &overrides {
            Some(overrides) => self.registry.merge(overrides),
            None => self.registry.clone(),
        };

        let path = self
            .path
            .child(PathSegment::new(key.clone(), capability.clone()));

        engine::resolve(Resolution {
            key,
            capability,
            data,
            registry,
            path,
            metrics: self.metrics.clone(),
        })
    }

    /// Demand `capability` with a default payload and no override
    pub async fn demand_named(&self, capability: impl Into<String>) -> Result<R>
    where
        D: Default,
    {
        self.demand(DemandRequest::new(capability)).await
    }
}

impl<D, R> Clone for Scope<D, R> {
    fn clone(&self) -> Self {
        Scope {
            key: self.key.clone(),
            capability: self.capability.clone(),
            path: self.path.clone(),
            registry: self.registry.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<D, R> fmt::Debug for Scope<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("key", &self.key)
            .field("capability", &self.capability)
            .field("path", &self.path)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supplier::Supplier;

    #[test]
    fn test_key_defaults_to_capability() {
        let request: DemandRequest<(), u32> = DemandRequest::new("first");
        assert_eq!(request.resolved_key(), "first");

        let request: DemandRequest<(), u32> = DemandRequest::new("first").key("");
        assert_eq!(request.resolved_key(), "first");

        let request: DemandRequest<(), u32> = DemandRequest::new("first").key("lhs");
        assert_eq!(request.resolved_key(), "lhs");
    }

    #[test]
    fn test_request_builders() {
        let request: DemandRequest<u32, u32> = DemandRequest::with_data("double", 4)
            .data(5)
            .overrides(RegistryOverride::new().add("double", Supplier::value(0)));

        assert_eq!(request.data, 5);
        assert!(request.overrides.is_some());
        assert_eq!(
            format!("{:?}", request),
            r#"DemandRequest { capability: "double", key: None, data: 5, overrides: Some(RegistryOverride { clear: false, remove: [], add: ["double"] }) }"#
        );
    }

    #[tokio::test]
    async fn test_demand_extends_path_and_keeps_parent() {
        let registry: Registry<(), String> = Registry::new().with(
            "echo",
            Supplier::from_fn(|_, scope: &Scope<(), String>| Ok(scope.path().to_string())),
        );
        let scope = Scope::new(
            "root".to_string(),
            "$$root".to_string(),
            DemandPath::root(),
            registry,
            None,
        );

        let rendered = scope
            .demand(DemandRequest::new("echo").key("hello"))
            .await
            .unwrap();

        assert_eq!(rendered, "root/hello(echo)");
        assert!(scope.path().is_empty());
        assert_eq!(scope.depth(), 0);
    }

    #[tokio::test]
    async fn test_demand_records_resolved_key() {
        let registry: Registry<(), String> = Registry::new().with(
            "echo",
            Supplier::from_fn(|_, scope: &Scope<(), String>| Ok(scope.key().to_string())),
        );
        let scope = Scope::new(
            "root".to_string(),
            "$$root".to_string(),
            DemandPath::root(),
            registry,
            None,
        );

        for request in [
            DemandRequest::new("echo"),
            DemandRequest::new("echo").key(""),
            DemandRequest::new("echo").key("lhs"),
        ] {
            let expected = request.resolved_key().to_owned();
            assert_eq!(scope.demand(request).await.unwrap(), expected);
        }
    }
}

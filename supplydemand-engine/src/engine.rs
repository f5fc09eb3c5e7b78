//! Resolution engine
//!
//! Resolves one capability against one registry and invokes its supplier.
//! Root demands and nested demands go through the same procedure; they
//! differ only in the registry and path they start from.

use crate::config::EngineConfig;
use crate::error::DemandError;
use crate::metrics::DemandMetrics;
use crate::registry::{Registry, RegistryOverride};
use crate::scope::Scope;
use crate::supplier::{Supplier, SupplyFuture};
use futures::future::{self, FutureExt};
use std::sync::Arc;
use std::time::Instant;
use supplydemand_types::{DemandPath, ROOT_CAPABILITY, ROOT_KEY};

/// One pending resolution step
pub(crate) struct Resolution<D, R> {
    pub(crate) key: String,
    pub(crate) capability: String,
    pub(crate) data: D,
    pub(crate) registry: Registry<D, R>,
    pub(crate) path: DemandPath,
    pub(crate) metrics: Option<Arc<DemandMetrics>>,
}

/// Look up the capability and run its supplier
///
/// A missing supplier fails immediately; no supplier is invoked.
pub(crate) fn resolve<D, R>(step: Resolution<D, R>) -> SupplyFuture<R>
where
    D: Send + 'static,
    R: Send + 'static,
{
    let Some(supplier) = step.registry.get(&step.capability).cloned() else {
        tracing::debug!(
            capability = %step.capability,
            path = %step.path,
            "Supplier not found"
        );
        if let Some(metrics) = &step.metrics {
            metrics.record_not_found(&step.capability);
        }
        return future::ready(Err(DemandError::not_found(step.capability, step.path))).boxed();
    };

    tracing::debug!(
        key = %step.key,
        capability = %step.capability,
        path = %step.path,
        "Resolving demand"
    );

    let scope = Scope::new(
        step.key,
        step.capability,
        step.path,
        step.registry,
        step.metrics,
    );
    invoke(&supplier, step.data, scope)
}

fn invoke<D, R>(supplier: &Supplier<D, R>, data: D, scope: Scope<D, R>) -> SupplyFuture<R>
where
    D: Send + 'static,
    R: Send + 'static,
{
    let counters = scope
        .metrics
        .as_ref()
        .map(|metrics| metrics.capability(scope.capability()));
    let path = scope.path().clone();
    let started = Instant::now();
    let pending = supplier.call(data, scope);

    async move {
        let result = pending.await;
        if let Some(counters) = counters {
            counters.record_completion(started.elapsed(), result.is_ok());
        }
        tracing::trace!(path = %path, ok = result.is_ok(), "Demand finished");
        result
    }
    .boxed()
}

/// Entry point for resolving a root supplier against a base registry
#[derive(Debug, Default)]
pub struct Engine {
    config: EngineConfig,
    metrics: Option<Arc<DemandMetrics>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let metrics = config
            .collect_metrics
            .then(|| Arc::new(DemandMetrics::new()));
        Engine { config, metrics }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Metrics collected so far, when enabled in the config
    pub fn metrics(&self) -> Option<&DemandMetrics> {
        self.metrics.as_deref()
    }

    /// Invoke `root` with key `root` and an empty path
    ///
    /// The root supplier is called by reference, never looked up. The
    /// future completes once its whole chain of nested demands has.
    pub fn init<D, R>(&self, root: Supplier<D, R>, registry: Registry<D, R>, data: D) -> SupplyFuture<R>
    where
        D: Send + 'static,
        R: Send + 'static,
    {
        let registry = if self.config.register_root {
            registry.merge(&RegistryOverride::new().add(ROOT_CAPABILITY, root.clone()))
        } else {
            registry
        };

        tracing::debug!(
            key = ROOT_KEY,
            suppliers = registry.len(),
            register_root = self.config.register_root,
            "Starting root demand"
        );

        let scope = Scope::new(
            ROOT_KEY.to_string(),
            ROOT_CAPABILITY.to_string(),
            DemandPath::root(),
            registry,
            self.metrics.clone(),
        );
        invoke(&root, data, scope)
    }
}

/// Run `root` against `registry` with a default payload and default config
pub fn init<D, R>(root: Supplier<D, R>, registry: Registry<D, R>) -> SupplyFuture<R>
where
    D: Default + Send + 'static,
    R: Send + 'static,
{
    Engine::default().init(root, registry, D::default())
}

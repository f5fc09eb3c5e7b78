//! Supplydemand Scoped Demand-Resolution Engine
//!
//! This crate resolves named capabilities on demand. A [`Registry`] maps
//! capability names to [`Supplier`]s; resolving a name invokes its supplier
//! with a payload and a [`Scope`], and the supplier may in turn demand
//! further capabilities through that scope.
//!
//! # Architecture
//!
//! ```text
//! init(root, registry)
//!   └─ root supplier ── scope.demand("sum") ──────────── sum supplier
//!                                                          ├─ scope.demand("first")
//!                                                          └─ scope.demand("second")
//! ```
//!
//! ## Scoped overrides
//!
//! A demand may carry a [`RegistryOverride`] (clear → remove → add). The
//! override produces a new registry for that demand's subtree only; the
//! caller's registry, and every sibling demand, keep their own view.
//!
//! ## Paths
//!
//! Each scope carries the [`DemandPath`] of `{key, type}` segments that led
//! to it. Paths are persistent: nesting links one new segment onto the
//! shared tail and never touches the parent's path.
//!
//! ## Failures
//!
//! A demand for a name that is not registered fails with
//! [`DemandError::SupplierNotFound`] before any supplier runs. Supplier
//! errors pass through untouched. Nothing is retried or cached.
//!
//! # Example
//!
//! ```rust
//! use supplydemand_engine::{init, Registry, Scope, Supplier};
//!
//! # futures::executor::block_on(async {
//! let registry = Registry::new()
//!     .with("first", Supplier::value(10))
//!     .with("second", Supplier::value(32));
//!
//! let root = Supplier::new(|_: (), scope: Scope<(), i32>| async move {
//!     let a = scope.demand_named("first").await?;
//!     let b = scope.demand_named("second").await?;
//!     Ok(a + b)
//! });
//!
//! assert_eq!(init(root, registry).await.unwrap(), 42);
//! # });
//! ```

#![warn(missing_debug_implementations)]

// Core modules
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod scope;
pub mod supplier;

// Typed layer
pub mod typed;

// Re-export main types
pub use config::EngineConfig;
pub use engine::{init, Engine};
pub use error::{DemandError, Result};
pub use metrics::{CapabilityMetrics, DemandMetrics, MetricsSnapshot};
pub use registry::{Registry, RegistryOverride};
pub use scope::{DemandRequest, Scope};
pub use supplier::{Supplier, SupplyFuture};
pub use supplydemand_types::{DemandPath, PathSegment, ROOT_CAPABILITY, ROOT_KEY};
pub use typed::{supply, Capability, DynRegistry, DynScope, DynSupplier};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::{init, Engine};
    pub use crate::error::{DemandError, Result};
    pub use crate::registry::{Registry, RegistryOverride};
    pub use crate::scope::{DemandRequest, Scope};
    pub use crate::supplier::Supplier;
    pub use crate::typed::{Capability, DynRegistry, DynScope};
    pub use supplydemand_types::DemandPath;
}

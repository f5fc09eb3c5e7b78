//! Typed capabilities over the dynamic registry
//!
//! The engine is agnostic to payload and result types. Hosts that mix many
//! value types in one registry use `serde_json::Value` for both, and this
//! module checks the name → type correspondence at the call sites: a
//! [`Capability`] ties a name to an input and an output type, and the
//! helpers below convert at the boundary.

use crate::error::{DemandError, Result};
use crate::registry::Registry;
use crate::scope::{DemandRequest, Scope};
use crate::supplier::Supplier;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

/// Registry whose suppliers exchange JSON values
pub type DynRegistry = Registry<Value, Value>;

/// Scope handed to suppliers in a [`DynRegistry`]
pub type DynScope = Scope<Value, Value>;

/// Supplier stored in a [`DynRegistry`]
pub type DynSupplier = Supplier<Value, Value>;

/// A named capability with fixed input and output types
pub trait Capability: 'static {
    /// Registry name of this capability
    const NAME: &'static str;

    /// Payload the supplier expects
    type Input: Serialize + DeserializeOwned + Send + 'static;

    /// Value the supplier produces
    type Output: Serialize + DeserializeOwned + Send + 'static;
}

fn encode<T: Serialize>(capability: &str, what: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .with_context(|| format!("failed to encode {} for capability `{}`", what, capability))
        .map_err(DemandError::from)
}

fn decode<T: DeserializeOwned>(capability: &str, what: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .with_context(|| format!("failed to decode {} for capability `{}`", what, capability))
        .map_err(DemandError::from)
}

/// Build a dynamic supplier for `C` from a typed async function
pub fn supply<C, F, Fut>(f: F) -> DynSupplier
where
    C: Capability,
    F: Fn(C::Input, DynScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C::Output>> + Send + 'static,
{
    Supplier::new(move |data: Value, scope: DynScope| {
        let pending = decode::<C::Input>(C::NAME, "input", data).map(|input| f(input, scope));
        async move {
            let output = pending?.await?;
            encode(C::NAME, "output", &output)
        }
    })
}

impl Registry<Value, Value> {
    /// Register a typed supplier under `C::NAME`
    pub fn provide<C, F, Fut>(self, f: F) -> Self
    where
        C: Capability,
        F: Fn(C::Input, DynScope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C::Output>> + Send + 'static,
    {
        self.with(C::NAME, supply::<C, F, Fut>(f))
    }
}

impl DemandRequest<Value, Value> {
    /// Request for `C` with an encoded payload
    pub fn typed<C: Capability>(input: &C::Input) -> Result<Self> {
        Ok(DemandRequest::with_data(C::NAME, encode(C::NAME, "input", input)?))
    }
}

impl Scope<Value, Value> {
    /// Demand `C` and decode its output
    pub async fn demand_typed<C: Capability>(&self, input: C::Input) -> Result<C::Output> {
        self.demand_decoded::<C>(DemandRequest::typed::<C>(&input)?)
            .await
    }

    /// Run a prepared request and decode the output as `C::Output`
    ///
    /// Use this when the request carries a key or an override; build it
    /// with [`DemandRequest::typed`].
    pub async fn demand_decoded<C: Capability>(
        &self,
        request: DemandRequest<Value, Value>,
    ) -> Result<C::Output> {
        let capability = request.capability.clone();
        let value = self.demand(request).await?;
        decode(&capability, "output", value)
    }
}

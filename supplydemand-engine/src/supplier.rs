//! Supplier handles
//!
//! A supplier is the unit of work bound to a capability name. The engine
//! treats it as opaque: it only calls it with a payload and a scope and
//! awaits the result.

use crate::error::Result;
use crate::scope::Scope;
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by suppliers and by `Scope::demand`
pub type SupplyFuture<R> = BoxFuture<'static, Result<R>>;

type SupplyFn<D, R> = dyn Fn(D, Scope<D, R>) -> SupplyFuture<R> + Send + Sync;

/// A clonable, type-erased producer of `R` from a payload `D`
pub struct Supplier<D, R> {
    func: Arc<SupplyFn<D, R>>,
}

impl<D, R> Supplier<D, R>
where
    D: Send + 'static,
    R: Send + 'static,
{
    /// Wrap an async closure
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(D, Scope<D, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        Supplier {
            func: Arc::new(move |data: D, scope: Scope<D, R>| f(data, scope).boxed()),
        }
    }

    /// Wrap a closure that completes without suspending
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(D, &Scope<D, R>) -> Result<R> + Send + Sync + 'static,
    {
        Supplier {
            func: Arc::new(move |data: D, scope: Scope<D, R>| future::ready(f(data, &scope)).boxed()),
        }
    }

    /// A supplier that ignores its input and yields a clone of `value`
    pub fn value(value: R) -> Self
    where
        R: Clone + Sync,
    {
        Supplier::from_fn(move |_, _| Ok(value.clone()))
    }

    /// Invoke the supplier
    pub fn call(&self, data: D, scope: Scope<D, R>) -> SupplyFuture<R> {
        (self.func)(data, scope)
    }
}

impl<D, R> Supplier<D, R> {
    /// Whether both handles refer to the same underlying function
    pub fn ptr_eq(&self, other: &Supplier<D, R>) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl<D, R> Clone for Supplier<D, R> {
    fn clone(&self) -> Self {
        Supplier {
            func: Arc::clone(&self.func),
        }
    }
}

impl<D, R> fmt::Debug for Supplier<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supplier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_function() {
        let a: Supplier<(), u32> = Supplier::value(1);
        let b = a.clone();
        let c: Supplier<(), u32> = Supplier::value(1);

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn test_debug_hides_closure() {
        let s: Supplier<(), u32> = Supplier::value(7);
        assert_eq!(format!("{:?}", s), "Supplier { .. }");
    }
}

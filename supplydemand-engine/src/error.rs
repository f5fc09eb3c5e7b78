//! Error types for demand resolution

use supplydemand_types::DemandPath;
use thiserror::Error;

/// Failure of a demand chain
#[derive(Debug, Error)]
pub enum DemandError {
    /// No supplier is registered for the demanded capability in the
    /// registry visible at that resolution step
    #[error("Supplier not found for type: {capability} (at {path})")]
    SupplierNotFound {
        /// The capability that was demanded
        capability: String,
        /// Path of the failed demand, including its own segment
        path: DemandPath,
    },

    /// A supplier's own failure, passed through untouched
    #[error(transparent)]
    Supplier(#[from] anyhow::Error),
}

impl DemandError {
    pub fn not_found(capability: impl Into<String>, path: DemandPath) -> Self {
        DemandError::SupplierNotFound {
            capability: capability.into(),
            path,
        }
    }

    pub fn is_supplier_not_found(&self) -> bool {
        matches!(self, DemandError::SupplierNotFound { .. })
    }

    /// Name of the missing capability, if this is a lookup failure
    pub fn missing_capability(&self) -> Option<&str> {
        match self {
            DemandError::SupplierNotFound { capability, .. } => Some(capability),
            DemandError::Supplier(_) => None,
        }
    }

    /// Path of the failed lookup, if this is a lookup failure
    pub fn missing_path(&self) -> Option<&DemandPath> {
        match self {
            DemandError::SupplierNotFound { path, .. } => Some(path),
            DemandError::Supplier(_) => None,
        }
    }
}

/// Result type using DemandError
pub type Result<T> = std::result::Result<T, DemandError>;

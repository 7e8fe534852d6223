//! # Vigil Kubernetes Policy Pack
//!
//! Declarative compliance rules for Kubernetes workloads, split by API
//! group: `apps` (Deployments) and `core` (Pods, Services). Resource types
//! use the `kubernetes:<group>/<version>:<Kind>` form.
//!
//! ```rust
//! use vigil_core::PolicyRegistry;
//!
//! let registry = PolicyRegistry::new();
//! vigil_policies_kubernetes::register_all(&registry)?;
//! # Ok::<(), vigil_core::RegistryError>(())
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod apps;
pub mod core;

use vigil_core::{PolicyRecord, PolicyRegistry, ResourceValue, Result};

/// Every policy in this pack
pub fn all_policies() -> Vec<PolicyRecord> {
    let mut records = Vec::new();
    records.extend(apps::policies());
    records.extend(core::policies());
    records
}

/// Register the whole pack
pub fn register_all(registry: &PolicyRegistry) -> Result<()> {
    for record in all_policies() {
        registry.register(record)?;
    }
    Ok(())
}

/// Containers declared at `path` within a workload's property tree
///
/// Yields an empty slice when the path is absent or not a sequence, so
/// rules degrade to "nothing to check" on malformed trees.
pub(crate) fn containers_at<'a>(
    properties: &'a ResourceValue,
    path: &str,
) -> &'a [ResourceValue] {
    properties
        .path(path)
        .and_then(ResourceValue::as_sequence)
        .unwrap_or(&[])
}

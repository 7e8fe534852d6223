//! # Vigil AWS Policy Pack
//!
//! Declarative AWS compliance rules for the Vigil registry. Each module
//! covers one service; each rule is a pure predicate over a resource's
//! property tree that reports a fixed message when the condition holds.
//!
//! Register the whole pack once at startup:
//!
//! ```rust
//! use vigil_core::PolicyRegistry;
//!
//! let registry = PolicyRegistry::new();
//! vigil_policies_aws::register_all(&registry)?;
//! # Ok::<(), vigil_core::RegistryError>(())
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod cloudtrail;
pub mod ec2;
pub mod efs;
pub mod iam;
pub mod rds;
pub mod s3;

use vigil_core::{PolicyRecord, PolicyRegistry, Result};

/// Every policy in this pack
pub fn all_policies() -> Vec<PolicyRecord> {
    let mut records = Vec::new();
    records.extend(cloudtrail::policies());
    records.extend(ec2::policies());
    records.extend(efs::policies());
    records.extend(iam::policies());
    records.extend(rds::policies());
    records.extend(s3::policies());
    records
}

/// Register the whole pack
///
/// Called once at startup. A duplicate or malformed name fails fast, since
/// it indicates an authoring mistake in the pack.
pub fn register_all(registry: &PolicyRegistry) -> Result<()> {
    for record in all_policies() {
        registry.register(record)?;
    }
    Ok(())
}

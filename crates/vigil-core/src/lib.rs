//! # Vigil Core
//!
//! Registry, selection engine, and resource model for the Vigil compliance
//! policy catalog.
//!
//! ## Overview
//!
//! Policy packs register their rules into a [`PolicyRegistry`] once at
//! startup. Callers then draw filtered subsets through a [`PolicySelector`],
//! which guarantees at-most-once selection per cycle and can stamp an
//! enforcement level onto the records it returns. Rules themselves are pure
//! predicates over a [`ResourceDescriptor`] that report violations through a
//! [`ViolationReporter`].
//!
//! ## Key Components
//!
//! - [`PolicyRegistry`]: append-only store of [`PolicyRecord`]s keyed by name
//! - [`PolicySelector`]: per-cycle filtered selection with partition semantics
//! - [`FilterCriteria`]: vendor/service/severity/topic selection criteria
//! - [`ResourceValue`]: tagged-union property tree rules navigate
//! - [`ViolationReporter`]: accumulates rule violations
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vigil_core::{
//!     EnforcementLevel, FilterCriteria, PolicyMetadata, PolicyRecord,
//!     PolicyRegistry, PolicySelector, Severity, Vendor,
//! };
//!
//! let registry = Arc::new(PolicyRegistry::new());
//! registry.register(PolicyRecord::new(
//!     "aws-s3-bucket-enable-versioning",
//!     "Checks that S3 buckets have versioning enabled.",
//!     PolicyMetadata::new(Vendor::Aws, Severity::Medium).with_service("s3"),
//!     Arc::new(|resource, reporter| {
//!         if !resource.properties.is_true("versioning.enabled") {
//!             reporter.report("S3 buckets should have versioning enabled.");
//!         }
//!     }),
//! ))?;
//!
//! let mut selector = PolicySelector::new(Arc::clone(&registry));
//! let criteria = FilterCriteria::any().with_vendors([Vendor::Aws]);
//! let mandatory = selector.filter(&criteria, Some(EnforcementLevel::Mandatory));
//! assert_eq!(mandatory.len(), 1);
//!
//! // The matched record is spent for this cycle.
//! assert!(selector.filter(&criteria, None).is_empty());
//! # Ok::<(), vigil_core::RegistryError>(())
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod registry;
pub mod resource;
pub mod selector;
pub mod types;
pub mod violation;

// Re-exports
pub use error::{RegistryError, Result};
pub use registry::{validate_policy_name, PolicyRegistry, RegistryStats};
pub use resource::{ResourceDescriptor, ResourceValue};
pub use selector::{FilterCriteria, PolicySelector, SelectorStats};
pub use types::{EnforcementLevel, PolicyMetadata, PolicyRecord, Severity, ValidateFn, Vendor};
pub use violation::{Violation, ViolationReporter};

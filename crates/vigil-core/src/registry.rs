//! Policy registry
//!
//! Single source of truth for the compliance rules known to the process.
//! Registration is append-only and happens once, synchronously, when the
//! policy packs load; afterwards the registry is read-mostly and safe for
//! concurrent lookups. The registry is an explicit object, not a global:
//! construct one per policy-pack load and share it via `Arc`.

use std::sync::OnceLock;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::types::{EnforcementLevel, PolicyRecord};

/// Policy naming convention: all-lowercase, hyphen-delimited
const NAME_PATTERN: &str = "^[a-z][a-z0-9-]+[a-z0-9]$";

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a literal; compilation cannot fail.
    RE.get_or_init(|| Regex::new(NAME_PATTERN).unwrap())
}

/// Check a policy name against the naming convention
pub fn validate_policy_name(name: &str) -> Result<()> {
    if name_regex().is_match(name) {
        Ok(())
    } else {
        Err(RegistryError::InvalidName(name.to_string()))
    }
}

/// Registry cardinality snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_count: usize,
}

/// In-memory store of registered policy records, keyed by name
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    records: DashMap<String, PolicyRecord>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy record
    ///
    /// Fails fast with [`RegistryError::DuplicateName`] when the name is
    /// already taken: a duplicate indicates an authoring mistake in a policy
    /// pack, not a runtime condition to recover from. Also rejects names
    /// that violate the naming convention.
    pub fn register(&self, record: PolicyRecord) -> Result<()> {
        validate_policy_name(&record.name)?;

        match self.records.entry(record.name.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateName(record.name)),
            Entry::Vacant(slot) => {
                debug!(policy = %record.name, severity = %record.metadata.severity, "registered policy");
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Look up a record by name
    ///
    /// Probing for a name that was never registered is routine; it yields
    /// `None`, never an error.
    pub fn get_by_name(&self, name: &str) -> Option<PolicyRecord> {
        self.records.get(name).map(|r| r.clone())
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Registry cardinality
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_count: self.records.len(),
        }
    }

    /// Overwrite the stored record's enforcement level, returning the
    /// updated record
    ///
    /// Used by the selector to stamp an override through to the shared
    /// record so later lookups observe it.
    pub(crate) fn set_enforcement(
        &self,
        name: &str,
        level: EnforcementLevel,
    ) -> Option<PolicyRecord> {
        self.records.get_mut(name).map(|mut record| {
            record.enforcement_level = level;
            record.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PolicyMetadata, Severity, Vendor};
    use std::sync::Arc;

    fn record(name: &str) -> PolicyRecord {
        PolicyRecord::new(
            name,
            "test policy",
            PolicyMetadata::new(Vendor::Aws, Severity::Medium),
            Arc::new(|_, _| {}),
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = PolicyRegistry::new();
        registry.register(record("aws-s3-bucket-enable-versioning")).unwrap();

        let found = registry.get_by_name("aws-s3-bucket-enable-versioning");
        assert!(found.is_some());
        assert!(registry.get_by_name("aws-s3-bucket-never-registered").is_none());
        assert_eq!(registry.stats().total_count, 1);
    }

    #[test]
    fn test_duplicate_name_fails_fast() {
        let registry = PolicyRegistry::new();
        registry.register(record("aws-ec2-instance-disallow-public-ip")).unwrap();

        let err = registry
            .register(record("aws-ec2-instance-disallow-public-ip"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(name) if name.contains("public-ip")));

        // The first registration survives.
        assert_eq!(registry.stats().total_count, 1);
    }

    #[test]
    fn test_name_convention_enforced() {
        // "ab" fails because the pattern requires at least three characters.
        for bad in ["AWS-policy", "has_underscore", "trailing-", "-leading", "ab", "with space"] {
            assert!(validate_policy_name(bad).is_err(), "accepted: {bad}");
        }
        for good in ["aws-ec2-instance-disallow-public-ip", "k8s-policy-2", "abc"] {
            assert!(validate_policy_name(good).is_ok(), "rejected: {good}");
        }
    }

    #[test]
    fn test_invalid_name_rejected_at_registration() {
        let registry = PolicyRegistry::new();
        let err = registry.register(record("Not-Valid")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));
        assert_eq!(registry.stats().total_count, 0);
    }

    #[test]
    fn test_names_sorted() {
        let registry = PolicyRegistry::new();
        registry.register(record("zzz-last-policy")).unwrap();
        registry.register(record("aaa-first-policy")).unwrap();
        assert_eq!(registry.names(), vec!["aaa-first-policy", "zzz-last-policy"]);
    }
}

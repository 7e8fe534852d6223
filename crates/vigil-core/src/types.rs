//! Policy record and metadata types
//!
//! A policy is a named, metadata-tagged compliance rule. Records are created
//! once at startup when the policy packs register themselves; only the
//! enforcement level is mutated afterwards, during selection.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::resource::ResourceDescriptor;
use crate::violation::ViolationReporter;

/// Cloud vendor a policy applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Aws,
    Kubernetes,
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Kubernetes => write!(f, "kubernetes"),
        }
    }
}

/// Ordered criticality of a policy violation
///
/// The derived ordering follows declaration order: `Low < Medium < High <
/// Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Runtime mode controlling whether a policy's violations block an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementLevel {
    /// Violations are reported but do not block (the default)
    Advisory,
    /// Violations block the operation
    Mandatory,
    /// Policy should not be evaluated. Selection still returns disabled
    /// records; honoring the skip is the evaluation host's responsibility.
    Disabled,
}

impl Default for EnforcementLevel {
    fn default() -> Self {
        Self::Advisory
    }
}

impl EnforcementLevel {
    /// Check if violations at this level block the operation
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Mandatory)
    }
}

impl fmt::Display for EnforcementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advisory => write!(f, "advisory"),
            Self::Mandatory => write!(f, "mandatory"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Structured classification tags attached to a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Vendor the policy applies to (exactly one)
    pub vendor: Vendor,

    /// Vendor service, e.g. "ec2" or "apps" (zero or one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Criticality of a violation
    pub severity: Severity,

    /// Topic tags, e.g. "encryption", "network" (order-insignificant)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub topics: BTreeSet<String>,

    /// Compliance framework identifiers, e.g. "cis", "pcidss"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frameworks: Option<BTreeSet<String>>,
}

impl PolicyMetadata {
    /// Create metadata with the two mandatory dimensions
    pub fn new(vendor: Vendor, severity: Severity) -> Self {
        Self {
            vendor,
            service: None,
            severity,
            topics: BTreeSet::new(),
            frameworks: None,
        }
    }

    /// Set the service tag
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set the topic tags
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    /// Set the compliance framework tags
    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks = Some(frameworks.into_iter().map(Into::into).collect());
        self
    }
}

/// Validation callback invoked once per resource under evaluation
///
/// The callback inspects the resource's property tree and reports a fixed
/// message for every condition that holds. Rules are pure: no shared state,
/// no I/O, no interaction between rules.
pub type ValidateFn = Arc<dyn Fn(&ResourceDescriptor, &mut ViolationReporter) + Send + Sync>;

/// One registered compliance rule
#[derive(Clone)]
pub struct PolicyRecord {
    /// Unique lowercase, hyphen-delimited identifier (immutable)
    pub name: String,

    /// Human-readable summary of what the rule checks
    pub description: String,

    /// Classification tags used for selection
    pub metadata: PolicyMetadata,

    /// Current enforcement level; may be overridden during selection
    pub enforcement_level: EnforcementLevel,

    /// The rule predicate
    pub validate: ValidateFn,
}

impl PolicyRecord {
    /// Create a record with the default advisory enforcement level
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        metadata: PolicyMetadata,
        validate: ValidateFn,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            metadata,
            enforcement_level: EnforcementLevel::default(),
            validate,
        }
    }

    /// Set the enforcement level
    pub fn with_enforcement_level(mut self, level: EnforcementLevel) -> Self {
        self.enforcement_level = level;
        self
    }

    /// Run the rule against a resource, collecting violations into `reporter`
    pub fn evaluate(&self, resource: &ResourceDescriptor, reporter: &mut ViolationReporter) {
        (self.validate)(resource, reporter);
    }
}

impl fmt::Debug for PolicyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRecord")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("metadata", &self.metadata)
            .field("enforcement_level", &self.enforcement_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceDescriptor;

    fn noop_record(name: &str) -> PolicyRecord {
        PolicyRecord::new(
            name,
            "test policy",
            PolicyMetadata::new(Vendor::Aws, Severity::Low),
            Arc::new(|_, _| {}),
        )
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_enforcement_defaults_to_advisory() {
        let record = noop_record("aws-test-policy");
        assert_eq!(record.enforcement_level, EnforcementLevel::Advisory);
        assert!(!record.enforcement_level.is_mandatory());
    }

    #[test]
    fn test_with_enforcement_level() {
        let record =
            noop_record("aws-test-policy").with_enforcement_level(EnforcementLevel::Mandatory);
        assert!(record.enforcement_level.is_mandatory());
    }

    #[test]
    fn test_metadata_builders() {
        let metadata = PolicyMetadata::new(Vendor::Kubernetes, Severity::High)
            .with_service("apps")
            .with_topics(["security", "containers"])
            .with_frameworks(["cis"]);

        assert_eq!(metadata.service.as_deref(), Some("apps"));
        assert!(metadata.topics.contains("security"));
        assert!(metadata.frameworks.unwrap().contains("cis"));
    }

    #[test]
    fn test_topics_compare_order_insensitive() {
        let a = PolicyMetadata::new(Vendor::Aws, Severity::Low).with_topics(["b", "a"]);
        let b = PolicyMetadata::new(Vendor::Aws, Severity::Low).with_topics(["a", "b"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_evaluate_invokes_callback() {
        let record = PolicyRecord::new(
            "aws-test-always-fails",
            "always reports",
            PolicyMetadata::new(Vendor::Aws, Severity::Low),
            Arc::new(|_, reporter| reporter.report("boom")),
        );

        let resource = ResourceDescriptor::new("aws:test", serde_json::json!({}).into());
        let mut reporter = ViolationReporter::new();
        record.evaluate(&resource, &mut reporter);
        assert_eq!(reporter.violations().len(), 1);
    }
}

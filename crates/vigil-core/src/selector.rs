//! Policy selection engine
//!
//! A selector draws filtered subsets of the registry for batch operations
//! ("apply only AWS critical-severity policies"), guaranteeing each policy
//! is handed out at most once per selection cycle. Selection is a set
//! partition, not a queue: repeated calls with the same criteria drain the
//! matching records, and `reset` restores the full set.
//!
//! Selectors are per-cycle objects. Running several evaluation cycles in
//! one process means one selector each, all sharing the same registry.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::registry::PolicyRegistry;
use crate::types::{EnforcementLevel, PolicyRecord, Severity, Vendor};

/// Selection criteria
///
/// Specified fields are ANDed together; within a field the listed values
/// are ORed. A field that is omitted, or supplied as an empty list, places
/// no constraint on that dimension. Unrecognized keys in a deserialized
/// criteria document are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendors: Option<Vec<Vendor>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severities: Option<Vec<Severity>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
}

impl FilterCriteria {
    /// Criteria matching every record
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_vendors<I: IntoIterator<Item = Vendor>>(mut self, vendors: I) -> Self {
        self.vendors = Some(vendors.into_iter().collect());
        self
    }

    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services = Some(services.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_severities<I: IntoIterator<Item = Severity>>(mut self, severities: I) -> Self {
        self.severities = Some(severities.into_iter().collect());
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = Some(topics.into_iter().map(Into::into).collect());
        self
    }

    /// Check a record against all specified dimensions
    pub fn matches(&self, record: &PolicyRecord) -> bool {
        if let Some(vendors) = unconstrained_if_empty(&self.vendors) {
            if !vendors.contains(&record.metadata.vendor) {
                return false;
            }
        }

        if let Some(services) = unconstrained_if_empty(&self.services) {
            let matched = record
                .metadata
                .service
                .as_ref()
                .is_some_and(|service| services.iter().any(|s| s == service));
            if !matched {
                return false;
            }
        }

        if let Some(severities) = unconstrained_if_empty(&self.severities) {
            if !severities.contains(&record.metadata.severity) {
                return false;
            }
        }

        if let Some(topics) = unconstrained_if_empty(&self.topics) {
            let matched = topics.iter().any(|t| record.metadata.topics.contains(t));
            if !matched {
                return false;
            }
        }

        true
    }
}

/// Treat an absent field and an empty list identically: no constraint.
fn unconstrained_if_empty<T>(field: &Option<Vec<T>>) -> Option<&Vec<T>> {
    field.as_ref().filter(|values| !values.is_empty())
}

/// Selector cardinality snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorStats {
    pub total_count: usize,
    pub remaining_count: usize,
}

/// Stateful cursor over the registry with at-most-once selection per cycle
#[derive(Debug)]
pub struct PolicySelector {
    registry: Arc<PolicyRegistry>,
    remaining: BTreeSet<String>,
}

impl PolicySelector {
    /// Create a selector whose remaining set snapshots the full registry
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        let remaining = registry.names().into_iter().collect();
        Self { registry, remaining }
    }

    /// Draw the records from `remaining` that satisfy `criteria`
    ///
    /// Matched records leave the remaining set, so a second identical call
    /// without an intervening [`reset`](Self::reset) returns nothing. When
    /// an enforcement override is supplied it is written through to the
    /// stored record before the returned copy is taken. Results are ordered
    /// by name.
    pub fn filter(
        &mut self,
        criteria: &FilterCriteria,
        enforcement_override: Option<EnforcementLevel>,
    ) -> Vec<PolicyRecord> {
        let mut selected = Vec::new();

        // BTreeSet iteration gives name order for free.
        for name in &self.remaining {
            if let Some(record) = self.registry.get_by_name(name) {
                if criteria.matches(&record) {
                    selected.push(name.clone());
                }
            }
        }

        let mut records = Vec::with_capacity(selected.len());
        for name in selected {
            self.remaining.remove(&name);
            let record = match enforcement_override {
                Some(level) => self.registry.set_enforcement(&name, level),
                None => self.registry.get_by_name(&name),
            };
            if let Some(record) = record {
                records.push(record);
            }
        }

        debug!(
            selected = records.len(),
            remaining = self.remaining.len(),
            "selection pass"
        );
        records
    }

    /// Restore the remaining set to the full registry snapshot
    pub fn reset(&mut self) {
        self.remaining = self.registry.names().into_iter().collect();
        debug!(remaining = self.remaining.len(), "selector reset");
    }

    /// Registry and remaining cardinalities
    pub fn stats(&self) -> SelectorStats {
        SelectorStats {
            total_count: self.registry.stats().total_count,
            remaining_count: self.remaining.len(),
        }
    }
}

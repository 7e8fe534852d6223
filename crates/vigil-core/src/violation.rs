//! Violation reporting
//!
//! Rules receive a reporter alongside the resource descriptor and call it
//! once per condition that holds. The reporter only accumulates; whether a
//! violation blocks anything is decided by the record's enforcement level.

use serde::{Deserialize, Serialize};

/// One reported policy violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Fixed, descriptive message defined by the rule
    pub message: String,

    /// Identifier of the offending resource, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
}

/// Collects violations during a rule evaluation
#[derive(Debug, Default)]
pub struct ViolationReporter {
    violations: Vec<Violation>,
}

impl ViolationReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a violation with no resource identifier
    pub fn report(&mut self, message: impl Into<String>) {
        self.violations.push(Violation {
            message: message.into(),
            urn: None,
        });
    }

    /// Report a violation against a specific resource
    pub fn report_for(&mut self, message: impl Into<String>, urn: impl Into<String>) {
        self.violations.push(Violation {
            message: message.into(),
            urn: Some(urn.into()),
        });
    }

    /// Violations collected so far
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Check whether any violation was reported
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consume the reporter, yielding the collected violations
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

//! IAM policies: managed policy documents, password policy, roles.

use std::sync::Arc;

use vigil_core::{PolicyMetadata, PolicyRecord, ResourceValue, Severity, Vendor};

/// All IAM policies in this module
pub fn policies() -> Vec<PolicyRecord> {
    vec![
        policy_disallow_wildcard_actions(),
        account_password_policy_require_minimum_length(),
        role_missing_description(),
    ]
}

/// Check an embedded IAM policy document for `Allow` statements whose
/// action list includes the full wildcard.
fn allows_wildcard_actions(document: &str) -> bool {
    let Ok(doc) = serde_json::from_str::<serde_json::Value>(document) else {
        // Not parseable as a policy document; nothing to flag.
        return false;
    };
    let Some(statements) = doc.get("Statement").and_then(|s| s.as_array()) else {
        return false;
    };

    statements.iter().any(|statement| {
        let allow = statement.get("Effect").and_then(|e| e.as_str()) == Some("Allow");
        if !allow {
            return false;
        }
        match statement.get("Action") {
            Some(serde_json::Value::String(action)) => action == "*",
            Some(serde_json::Value::Array(actions)) => {
                actions.iter().any(|action| action.as_str() == Some("*"))
            }
            _ => false,
        }
    })
}

pub fn policy_disallow_wildcard_actions() -> PolicyRecord {
    PolicyRecord::new(
        "aws-iam-policy-disallow-wildcard-actions",
        "Checks that IAM policy documents do not allow every action.",
        PolicyMetadata::new(Vendor::Aws, Severity::Critical)
            .with_service("iam")
            .with_topics(["security", "permissions"])
            .with_frameworks(["cis", "iso27001"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type("aws:iam/policy:Policy") {
                return;
            }
            let document = resource
                .properties
                .get("policy")
                .and_then(ResourceValue::as_str)
                .unwrap_or("");
            if allows_wildcard_actions(document) {
                reporter.report("IAM policies should not allow wildcard ('*') actions.");
            }
        }),
    )
}

pub fn account_password_policy_require_minimum_length() -> PolicyRecord {
    PolicyRecord::new(
        "aws-iam-account-password-policy-require-minimum-length",
        "Checks that the account password policy requires at least 14 characters.",
        PolicyMetadata::new(Vendor::Aws, Severity::Medium)
            .with_service("iam")
            .with_topics(["security"])
            .with_frameworks(["cis", "pcidss"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type("aws:iam/accountPasswordPolicy:AccountPasswordPolicy") {
                return;
            }
            let length = resource
                .properties
                .get("minimumPasswordLength")
                .and_then(ResourceValue::as_f64)
                .unwrap_or(0.0);
            if length < 14.0 {
                reporter.report(
                    "IAM account password policies should require at least 14 characters.",
                );
            }
        }),
    )
}

pub fn role_missing_description() -> PolicyRecord {
    PolicyRecord::new(
        "aws-iam-role-missing-description",
        "Checks that IAM roles have a description.",
        PolicyMetadata::new(Vendor::Aws, Severity::Low)
            .with_service("iam")
            .with_topics(["documentation"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type("aws:iam/role:Role") {
                return;
            }
            let description = resource
                .properties
                .get("description")
                .and_then(ResourceValue::as_str)
                .unwrap_or("");
            if description.is_empty() {
                reporter.report("IAM roles should have a description.");
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vigil_core::{ResourceDescriptor, Violation, ViolationReporter};

    fn violations(record: &PolicyRecord, resource: &ResourceDescriptor) -> Vec<Violation> {
        let mut reporter = ViolationReporter::new();
        record.evaluate(resource, &mut reporter);
        reporter.into_violations()
    }

    #[test]
    fn test_wildcard_action_string_reported() {
        let document = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"*","Resource":"*"}]}"#;
        let resource = ResourceDescriptor::new(
            "aws:iam/policy:Policy",
            json!({ "policy": document }).into(),
        );
        assert_eq!(violations(&policy_disallow_wildcard_actions(), &resource).len(), 1);
    }

    #[test]
    fn test_wildcard_in_action_array_reported() {
        let document =
            r#"{"Statement":[{"Effect":"Allow","Action":["s3:GetObject","*"],"Resource":"*"}]}"#;
        let resource = ResourceDescriptor::new(
            "aws:iam/policy:Policy",
            json!({ "policy": document }).into(),
        );
        assert_eq!(violations(&policy_disallow_wildcard_actions(), &resource).len(), 1);
    }

    #[test]
    fn test_deny_wildcard_not_reported() {
        // A Deny statement with wildcard actions is a guardrail, not a hole.
        let document = r#"{"Statement":[{"Effect":"Deny","Action":"*","Resource":"*"}]}"#;
        let resource = ResourceDescriptor::new(
            "aws:iam/policy:Policy",
            json!({ "policy": document }).into(),
        );
        assert!(violations(&policy_disallow_wildcard_actions(), &resource).is_empty());
    }

    #[test]
    fn test_unparseable_document_not_reported() {
        let resource = ResourceDescriptor::new(
            "aws:iam/policy:Policy",
            json!({ "policy": "not json" }).into(),
        );
        assert!(violations(&policy_disallow_wildcard_actions(), &resource).is_empty());
    }

    #[test]
    fn test_short_password_length_reported() {
        let short = ResourceDescriptor::new(
            "aws:iam/accountPasswordPolicy:AccountPasswordPolicy",
            json!({ "minimumPasswordLength": 8 }).into(),
        );
        assert_eq!(
            violations(&account_password_policy_require_minimum_length(), &short).len(),
            1
        );

        let long = ResourceDescriptor::new(
            "aws:iam/accountPasswordPolicy:AccountPasswordPolicy",
            json!({ "minimumPasswordLength": 14 }).into(),
        );
        assert!(violations(&account_password_policy_require_minimum_length(), &long).is_empty());
    }
}

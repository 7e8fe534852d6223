//! RDS instance and cluster policies.

use std::sync::Arc;

use vigil_core::{PolicyMetadata, PolicyRecord, ResourceValue, Severity, Vendor};

const INSTANCE: &str = "aws:rds/instance:Instance";
const CLUSTER: &str = "aws:rds/cluster:Cluster";

/// All RDS policies in this module
pub fn policies() -> Vec<PolicyRecord> {
    vec![
        instance_enable_storage_encryption(),
        instance_disallow_public_access(),
        instance_enable_backup_retention(),
        instance_enable_multi_az(),
        cluster_enable_storage_encryption(),
    ]
}

pub fn instance_enable_storage_encryption() -> PolicyRecord {
    PolicyRecord::new(
        "aws-rds-instance-enable-storage-encryption",
        "Checks that RDS instances have storage encryption enabled.",
        PolicyMetadata::new(Vendor::Aws, Severity::High)
            .with_service("rds")
            .with_topics(["encryption", "storage"])
            .with_frameworks(["pcidss", "hipaa", "iso27001"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(INSTANCE) {
                return;
            }
            if !resource.properties.is_true("storageEncrypted") {
                reporter.report("RDS instances should have storage encryption enabled.");
            }
        }),
    )
}

pub fn instance_disallow_public_access() -> PolicyRecord {
    PolicyRecord::new(
        "aws-rds-instance-disallow-public-access",
        "Checks that RDS instances are not publicly accessible.",
        PolicyMetadata::new(Vendor::Aws, Severity::Critical)
            .with_service("rds")
            .with_topics(["network", "security"])
            .with_frameworks(["cis", "pcidss"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(INSTANCE) {
                return;
            }
            if resource.properties.is_true("publiclyAccessible") {
                reporter.report("RDS instances should not be publicly accessible.");
            }
        }),
    )
}

pub fn instance_enable_backup_retention() -> PolicyRecord {
    PolicyRecord::new(
        "aws-rds-instance-enable-backup-retention",
        "Checks that RDS instances retain automated backups.",
        PolicyMetadata::new(Vendor::Aws, Severity::Medium)
            .with_service("rds")
            .with_topics(["availability"])
            .with_frameworks(["iso27001"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(INSTANCE) {
                return;
            }
            let retention = resource
                .properties
                .get("backupRetentionPeriod")
                .and_then(ResourceValue::as_f64)
                .unwrap_or(0.0);
            if retention <= 0.0 {
                reporter.report("RDS instances should have backup retention enabled.");
            }
        }),
    )
}

pub fn instance_enable_multi_az() -> PolicyRecord {
    PolicyRecord::new(
        "aws-rds-instance-enable-multi-az",
        "Checks that RDS instances span multiple availability zones.",
        PolicyMetadata::new(Vendor::Aws, Severity::Low)
            .with_service("rds")
            .with_topics(["availability"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(INSTANCE) {
                return;
            }
            if !resource.properties.is_true("multiAz") {
                reporter.report(
                    "RDS instances should be deployed across multiple availability zones.",
                );
            }
        }),
    )
}

pub fn cluster_enable_storage_encryption() -> PolicyRecord {
    PolicyRecord::new(
        "aws-rds-cluster-enable-storage-encryption",
        "Checks that RDS clusters have storage encryption enabled.",
        PolicyMetadata::new(Vendor::Aws, Severity::High)
            .with_service("rds")
            .with_topics(["encryption", "storage"])
            .with_frameworks(["pcidss", "hipaa"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(CLUSTER) {
                return;
            }
            if !resource.properties.is_true("storageEncrypted") {
                reporter.report("RDS clusters should have storage encryption enabled.");
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
    fn test_zero_and_absent_retention_reported() {
        let zero = ResourceDescriptor::new(
            INSTANCE,
            json!({ "backupRetentionPeriod": 0 }).into(),
        );
        assert_eq!(violations(&instance_enable_backup_retention(), &zero).len(), 1);

        let absent = ResourceDescriptor::new(INSTANCE, json!({}).into());
        assert_eq!(violations(&instance_enable_backup_retention(), &absent).len(), 1);

        let retained = ResourceDescriptor::new(
            INSTANCE,
            json!({ "backupRetentionPeriod": 7 }).into(),
        );
        assert!(violations(&instance_enable_backup_retention(), &retained).is_empty());
    }

    #[test]
    fn test_public_instance_reported() {
        let public = ResourceDescriptor::new(
            INSTANCE,
            json!({ "publiclyAccessible": true }).into(),
        );
        assert_eq!(violations(&instance_disallow_public_access(), &public).len(), 1);
    }

    #[test]
    fn test_cluster_encryption() {
        let plain = ResourceDescriptor::new(CLUSTER, json!({}).into());
        assert_eq!(violations(&cluster_enable_storage_encryption(), &plain).len(), 1);

        let encrypted =
            ResourceDescriptor::new(CLUSTER, json!({ "storageEncrypted": true }).into());
        assert!(violations(&cluster_enable_storage_encryption(), &encrypted).is_empty());
    }
}

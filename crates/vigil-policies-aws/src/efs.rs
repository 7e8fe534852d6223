//! EFS file system policies.

use std::sync::Arc;

use vigil_core::{PolicyMetadata, PolicyRecord, Severity, Vendor};

/// All EFS policies in this module
pub fn policies() -> Vec<PolicyRecord> {
    vec![filesystem_enable_encryption_at_rest()]
}

pub fn filesystem_enable_encryption_at_rest() -> PolicyRecord {
    PolicyRecord::new(
        "aws-efs-filesystem-enable-encryption-at-rest",
        "Checks that EFS file systems have encryption at rest enabled.",
        PolicyMetadata::new(Vendor::Aws, Severity::High)
            .with_service("efs")
            .with_topics(["encryption", "storage"])
            .with_frameworks(["pcidss", "hipaa"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type("aws:efs/fileSystem:FileSystem") {
                return;
            }
            if !resource.properties.is_true("encrypted") {
                reporter.report("EFS file systems should have encryption at rest enabled.");
            }
        }),
    )
}

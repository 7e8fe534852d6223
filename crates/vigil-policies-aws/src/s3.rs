//! S3 bucket policies.

use std::sync::Arc;

use vigil_core::{PolicyMetadata, PolicyRecord, ResourceValue, Severity, Vendor};

const BUCKET: &str = "aws:s3/bucket:Bucket";

/// All S3 policies in this module
pub fn policies() -> Vec<PolicyRecord> {
    vec![
        bucket_disallow_public_read(),
        bucket_enable_server_side_encryption(),
        bucket_enable_versioning(),
        bucket_enable_access_logging(),
        bucket_enable_replication(),
    ]
}

pub fn bucket_disallow_public_read() -> PolicyRecord {
    PolicyRecord::new(
        "aws-s3-bucket-disallow-public-read",
        "Checks that S3 buckets do not have a public ACL.",
        PolicyMetadata::new(Vendor::Aws, Severity::Critical)
            .with_service("s3")
            .with_topics(["network", "security"])
            .with_frameworks(["cis", "pcidss"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(BUCKET) {
                return;
            }
            let acl = resource
                .properties
                .get("acl")
                .and_then(ResourceValue::as_str);
            if matches!(acl, Some("public-read") | Some("public-read-write")) {
                reporter.report("S3 buckets should not have a public ACL.");
            }
        }),
    )
}

pub fn bucket_enable_server_side_encryption() -> PolicyRecord {
    PolicyRecord::new(
        "aws-s3-bucket-enable-server-side-encryption",
        "Checks that S3 buckets have server-side encryption configured.",
        PolicyMetadata::new(Vendor::Aws, Severity::High)
            .with_service("s3")
            .with_topics(["encryption", "storage"])
            .with_frameworks(["pcidss", "hipaa", "iso27001"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(BUCKET) {
                return;
            }
            if resource
                .properties
                .get("serverSideEncryptionConfiguration")
                .is_none()
            {
                reporter.report("S3 buckets should have server-side encryption enabled.");
            }
        }),
    )
}

pub fn bucket_enable_versioning() -> PolicyRecord {
    PolicyRecord::new(
        "aws-s3-bucket-enable-versioning",
        "Checks that S3 buckets have versioning enabled.",
        PolicyMetadata::new(Vendor::Aws, Severity::Medium)
            .with_service("s3")
            .with_topics(["availability", "storage"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(BUCKET) {
                return;
            }
            if !resource.properties.is_true("versioning.enabled") {
                reporter.report("S3 buckets should have versioning enabled.");
            }
        }),
    )
}

pub fn bucket_enable_access_logging() -> PolicyRecord {
    PolicyRecord::new(
        "aws-s3-bucket-enable-access-logging",
        "Checks that S3 buckets have access logging configured.",
        PolicyMetadata::new(Vendor::Aws, Severity::Medium)
            .with_service("s3")
            .with_topics(["logging"])
            .with_frameworks(["cis"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(BUCKET) {
                return;
            }
            let has_logging = resource
                .properties
                .get("loggings")
                .and_then(ResourceValue::as_sequence)
                .is_some_and(|targets| !targets.is_empty());
            if !has_logging {
                reporter.report("S3 buckets should have access logging enabled.");
            }
        }),
    )
}

pub fn bucket_enable_replication() -> PolicyRecord {
    PolicyRecord::new(
        "aws-s3-bucket-enable-replication",
        "Checks that S3 buckets have cross-region replication configured.",
        PolicyMetadata::new(Vendor::Aws, Severity::Low)
            .with_service("s3")
            .with_topics(["availability"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(BUCKET) {
                return;
            }
            if resource.properties.get("replicationConfiguration").is_none() {
                reporter.report("S3 buckets should have cross-region replication configured.");
            }
        }),
    )
}

//! CloudTrail trail policies.

use std::sync::Arc;

use vigil_core::{PolicyMetadata, PolicyRecord, ResourceValue, Severity, Vendor};

const TRAIL: &str = "aws:cloudtrail/trail:Trail";

/// All CloudTrail policies in this module
pub fn policies() -> Vec<PolicyRecord> {
    vec![
        trail_enable_log_validation(),
        trail_enable_multi_region(),
        trail_enable_log_encryption(),
    ]
}

pub fn trail_enable_log_validation() -> PolicyRecord {
    PolicyRecord::new(
        "aws-cloudtrail-trail-enable-log-validation",
        "Checks that CloudTrail trails have log file validation enabled.",
        PolicyMetadata::new(Vendor::Aws, Severity::Medium)
            .with_service("cloudtrail")
            .with_topics(["logging"])
            .with_frameworks(["cis"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(TRAIL) {
                return;
            }
            if !resource.properties.is_true("enableLogFileValidation") {
                reporter.report("CloudTrail trails should have log file validation enabled.");
            }
        }),
    )
}

pub fn trail_enable_multi_region() -> PolicyRecord {
    PolicyRecord::new(
        "aws-cloudtrail-trail-enable-multi-region",
        "Checks that CloudTrail trails capture events from every region.",
        PolicyMetadata::new(Vendor::Aws, Severity::Medium)
            .with_service("cloudtrail")
            .with_topics(["logging"])
            .with_frameworks(["cis"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(TRAIL) {
                return;
            }
            if !resource.properties.is_true("isMultiRegionTrail") {
                reporter.report("CloudTrail trails should be multi-region.");
            }
        }),
    )
}

pub fn trail_enable_log_encryption() -> PolicyRecord {
    PolicyRecord::new(
        "aws-cloudtrail-trail-enable-log-encryption",
        "Checks that CloudTrail trails encrypt logs with a KMS key.",
        PolicyMetadata::new(Vendor::Aws, Severity::High)
            .with_service("cloudtrail")
            .with_topics(["encryption", "logging"])
            .with_frameworks(["cis", "pcidss"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(TRAIL) {
                return;
            }
            let has_key = resource
                .properties
                .get("kmsKeyId")
                .and_then(ResourceValue::as_str)
                .is_some_and(|key| !key.is_empty());
            if !has_key {
                reporter.report("CloudTrail trails should encrypt logs with a KMS key.");
            }
        }),
    )
}

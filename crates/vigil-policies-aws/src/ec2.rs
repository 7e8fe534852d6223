//! EC2 policies: instances, volumes, security groups.

use std::sync::Arc;

use vigil_core::{PolicyMetadata, PolicyRecord, ResourceValue, Severity, Vendor};

/// All EC2 policies in this module
pub fn policies() -> Vec<PolicyRecord> {
    vec![
        instance_disallow_public_ip(),
        instance_enable_detailed_monitoring(),
        instance_require_imdsv2(),
        volume_disallow_unencrypted_volume(),
        security_group_missing_description(),
    ]
}

pub fn instance_disallow_public_ip() -> PolicyRecord {
    PolicyRecord::new(
        "aws-ec2-instance-disallow-public-ip",
        "Checks that EC2 instances do not have a public IP address.",
        PolicyMetadata::new(Vendor::Aws, Severity::High)
            .with_service("ec2")
            .with_topics(["network", "security"])
            .with_frameworks(["cis", "iso27001"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type("aws:ec2/instance:Instance") {
                return;
            }
            if resource.properties.is_true("associatePublicIpAddress") {
                reporter.report("EC2 instances should not have a public IP address.");
            }
        }),
    )
}

pub fn instance_enable_detailed_monitoring() -> PolicyRecord {
    PolicyRecord::new(
        "aws-ec2-instance-enable-detailed-monitoring",
        "Checks that EC2 instances have detailed monitoring enabled.",
        PolicyMetadata::new(Vendor::Aws, Severity::Low)
            .with_service("ec2")
            .with_topics(["logging"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type("aws:ec2/instance:Instance") {
                return;
            }
            if !resource.properties.is_true("monitoring") {
                reporter.report("EC2 instances should have detailed monitoring enabled.");
            }
        }),
    )
}

pub fn instance_require_imdsv2() -> PolicyRecord {
    PolicyRecord::new(
        "aws-ec2-instance-require-imdsv2",
        "Checks that EC2 instances require IMDSv2 for metadata access.",
        PolicyMetadata::new(Vendor::Aws, Severity::High)
            .with_service("ec2")
            .with_topics(["security"])
            .with_frameworks(["cis"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type("aws:ec2/instance:Instance") {
                return;
            }
            let tokens = resource
                .properties
                .path("metadataOptions.httpTokens")
                .and_then(ResourceValue::as_str);
            if tokens != Some("required") {
                reporter.report("EC2 instances should require IMDSv2.");
            }
        }),
    )
}

pub fn volume_disallow_unencrypted_volume() -> PolicyRecord {
    PolicyRecord::new(
        "aws-ec2-volume-disallow-unencrypted-volume",
        "Checks that EBS volumes are encrypted.",
        PolicyMetadata::new(Vendor::Aws, Severity::High)
            .with_service("ec2")
            .with_topics(["encryption", "storage"])
            .with_frameworks(["pcidss", "iso27001", "hipaa"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type("aws:ec2/volume:Volume") {
                return;
            }
            if !resource.properties.is_true("encrypted") {
                reporter.report("EBS volumes should be encrypted.");
            }
        }),
    )
}

pub fn security_group_missing_description() -> PolicyRecord {
    PolicyRecord::new(
        "aws-ec2-security-group-missing-description",
        "Checks that EC2 security groups have a description.",
        PolicyMetadata::new(Vendor::Aws, Severity::Low)
            .with_service("ec2")
            .with_topics(["documentation"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type("aws:ec2/securityGroup:SecurityGroup") {
                return;
            }
            let description = resource
                .properties
                .get("description")
                .and_then(ResourceValue::as_str)
                .unwrap_or("");
            if description.is_empty() {
                reporter.report("EC2 security groups should have a description.");
            }
        }),
    )
}

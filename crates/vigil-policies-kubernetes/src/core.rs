//! core/v1 policies (Pods, Services).

use std::sync::Arc;

use vigil_core::{PolicyMetadata, PolicyRecord, ResourceValue, Severity, Vendor};

use crate::containers_at;

const POD: &str = "kubernetes:core/v1:Pod";
const SERVICE: &str = "kubernetes:core/v1:Service";
const CONTAINERS: &str = "spec.containers";

/// All core/v1 policies in this module
pub fn policies() -> Vec<PolicyRecord> {
    vec![
        pod_disallow_privileged_container(),
        pod_disallow_host_network(),
        pod_require_run_as_non_root(),
        service_disallow_nodeport(),
    ]
}

pub fn pod_disallow_privileged_container() -> PolicyRecord {
    PolicyRecord::new(
        "kubernetes-core-pod-disallow-privileged-container",
        "Checks that Pod containers do not run privileged.",
        PolicyMetadata::new(Vendor::Kubernetes, Severity::Critical)
            .with_service("core")
            .with_topics(["security", "containers"])
            .with_frameworks(["cis"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(POD) {
                return;
            }
            for container in containers_at(&resource.properties, CONTAINERS) {
                if container.is_true("securityContext.privileged") {
                    reporter.report("Pod containers should not run privileged.");
                }
            }
        }),
    )
}

pub fn pod_disallow_host_network() -> PolicyRecord {
    PolicyRecord::new(
        "kubernetes-core-pod-disallow-host-network",
        "Checks that Pods do not share the host network namespace.",
        PolicyMetadata::new(Vendor::Kubernetes, Severity::High)
            .with_service("core")
            .with_topics(["network", "security"])
            .with_frameworks(["cis"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(POD) {
                return;
            }
            if resource.properties.is_true("spec.hostNetwork") {
                reporter.report("Pods should not share the host network namespace.");
            }
        }),
    )
}

pub fn pod_require_run_as_non_root() -> PolicyRecord {
    PolicyRecord::new(
        "kubernetes-core-pod-require-run-as-non-root",
        "Checks that Pods declare a non-root security context.",
        PolicyMetadata::new(Vendor::Kubernetes, Severity::High)
            .with_service("core")
            .with_topics(["security", "containers"])
            .with_frameworks(["cis", "iso27001"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(POD) {
                return;
            }
            if !resource.properties.is_true("spec.securityContext.runAsNonRoot") {
                reporter.report("Pods should declare runAsNonRoot in their security context.");
            }
        }),
    )
}

pub fn service_disallow_nodeport() -> PolicyRecord {
    PolicyRecord::new(
        "kubernetes-core-service-disallow-nodeport",
        "Checks that Services are not exposed via NodePort.",
        PolicyMetadata::new(Vendor::Kubernetes, Severity::Medium)
            .with_service("core")
            .with_topics(["network"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(SERVICE) {
                return;
            }
            let service_type = resource
                .properties
                .path("spec.type")
                .and_then(ResourceValue::as_str);
            if service_type == Some("NodePort") {
                reporter.report("Services should not be exposed via NodePort.");
            }
        }),
    )
}

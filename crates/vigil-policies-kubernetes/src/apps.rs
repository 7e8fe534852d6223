//! apps/v1 workload policies (Deployments).

use std::sync::Arc;

use vigil_core::{PolicyMetadata, PolicyRecord, ResourceValue, Severity, Vendor};

use crate::containers_at;

const DEPLOYMENT: &str = "kubernetes:apps/v1:Deployment";
const CONTAINERS: &str = "spec.template.spec.containers";

/// All apps/v1 policies in this module
pub fn policies() -> Vec<PolicyRecord> {
    vec![
        deployment_minimum_replicas(),
        deployment_disallow_latest_tag(),
        deployment_require_resource_limits(),
        deployment_require_liveness_probe(),
        deployment_require_readiness_probe(),
    ]
}

pub fn deployment_minimum_replicas() -> PolicyRecord {
    PolicyRecord::new(
        "kubernetes-apps-deployment-minimum-replicas",
        "Checks that Deployments run more than one replica.",
        PolicyMetadata::new(Vendor::Kubernetes, Severity::Medium)
            .with_service("apps")
            .with_topics(["availability"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(DEPLOYMENT) {
                return;
            }
            let replicas = resource
                .properties
                .path("spec.replicas")
                .and_then(ResourceValue::as_f64)
                .unwrap_or(1.0);
            if replicas < 2.0 {
                reporter.report("Deployments should run more than one replica.");
            }
        }),
    )
}

pub fn deployment_disallow_latest_tag() -> PolicyRecord {
    PolicyRecord::new(
        "kubernetes-apps-deployment-disallow-latest-tag",
        "Checks that container images pin a tag other than 'latest'.",
        PolicyMetadata::new(Vendor::Kubernetes, Severity::Medium)
            .with_service("apps")
            .with_topics(["containers"])
            .with_frameworks(["cis"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(DEPLOYMENT) {
                return;
            }
            for container in containers_at(&resource.properties, CONTAINERS) {
                let image = container
                    .get("image")
                    .and_then(ResourceValue::as_str)
                    .unwrap_or("");
                if image.ends_with(":latest") || (!image.is_empty() && !image.contains(':')) {
                    reporter.report(
                        "Deployment containers should pin an image tag other than 'latest'.",
                    );
                }
            }
        }),
    )
}

pub fn deployment_require_resource_limits() -> PolicyRecord {
    PolicyRecord::new(
        "kubernetes-apps-deployment-require-resource-limits",
        "Checks that every Deployment container declares resource limits.",
        PolicyMetadata::new(Vendor::Kubernetes, Severity::Medium)
            .with_service("apps")
            .with_topics(["containers", "availability"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(DEPLOYMENT) {
                return;
            }
            for container in containers_at(&resource.properties, CONTAINERS) {
                if container.path("resources.limits").is_none() {
                    reporter.report("Deployment containers should declare resource limits.");
                }
            }
        }),
    )
}

pub fn deployment_require_liveness_probe() -> PolicyRecord {
    PolicyRecord::new(
        "kubernetes-apps-deployment-require-liveness-probe",
        "Checks that every Deployment container declares a liveness probe.",
        PolicyMetadata::new(Vendor::Kubernetes, Severity::Low)
            .with_service("apps")
            .with_topics(["availability", "containers"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(DEPLOYMENT) {
                return;
            }
            for container in containers_at(&resource.properties, CONTAINERS) {
                if container.get("livenessProbe").is_none() {
                    reporter.report("Deployment containers should declare a liveness probe.");
                }
            }
        }),
    )
}

pub fn deployment_require_readiness_probe() -> PolicyRecord {
    PolicyRecord::new(
        "kubernetes-apps-deployment-require-readiness-probe",
        "Checks that every Deployment container declares a readiness probe.",
        PolicyMetadata::new(Vendor::Kubernetes, Severity::Low)
            .with_service("apps")
            .with_topics(["availability", "containers"]),
        Arc::new(|resource, reporter| {
            if !resource.is_type(DEPLOYMENT) {
                return;
            }
            for container in containers_at(&resource.properties, CONTAINERS) {
                if container.get("readinessProbe").is_none() {
                    reporter.report("Deployment containers should declare a readiness probe.");
                }
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

    fn deployment(spec: serde_json::Value) -> ResourceDescriptor {
        ResourceDescriptor::new(DEPLOYMENT, json!({ "spec": spec }).into())
    }

    #[test]
    fn test_single_replica_reported() {
        let single = deployment(json!({ "replicas": 1 }));
        assert_eq!(violations(&deployment_minimum_replicas(), &single).len(), 1);

        // Absent replicas defaults to one in the API server.
        let absent = deployment(json!({}));
        assert_eq!(violations(&deployment_minimum_replicas(), &absent).len(), 1);

        let scaled = deployment(json!({ "replicas": 3 }));
        assert!(violations(&deployment_minimum_replicas(), &scaled).is_empty());
    }

    #[test]
    fn test_latest_and_untagged_images_reported() {
        let workload = deployment(json!({
            "template": { "spec": { "containers": [
                { "image": "nginx:latest" },
                { "image": "nginx" },
                { "image": "nginx:1.27" },
            ] } }
        }));
        assert_eq!(violations(&deployment_disallow_latest_tag(), &workload).len(), 2);
    }

    #[test]
    fn test_one_violation_per_unlimited_container() {
        let workload = deployment(json!({
            "template": { "spec": { "containers": [
                { "name": "app" },
                { "name": "sidecar", "resources": { "limits": { "cpu": "500m" } } },
                { "name": "init-helper" },
            ] } }
        }));
        assert_eq!(
            violations(&deployment_require_resource_limits(), &workload).len(),
            2
        );
    }
}

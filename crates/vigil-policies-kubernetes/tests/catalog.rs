//! Pack-level catalog tests.

use std::sync::Arc;

use vigil_core::{FilterCriteria, PolicyRegistry, PolicySelector, Vendor};

#[test]
fn pack_registers_without_conflicts() {
    let registry = PolicyRegistry::new();
    vigil_policies_kubernetes::register_all(&registry).unwrap();
    assert_eq!(
        registry.stats().total_count,
        vigil_policies_kubernetes::all_policies().len()
    );
}

#[test]
fn every_record_is_tagged_kubernetes() {
    for record in vigil_policies_kubernetes::all_policies() {
        assert_eq!(record.metadata.vendor, Vendor::Kubernetes, "{}", record.name);
        assert!(record.name.starts_with("kubernetes-"), "{}", record.name);
    }
}

#[test]
fn both_packs_coexist_in_one_registry() {
    let registry = Arc::new(PolicyRegistry::new());
    vigil_policies_kubernetes::register_all(&registry).unwrap();
    vigil_policies_aws_smoke(&registry);

    let mut selector = PolicySelector::new(Arc::clone(&registry));
    let kubernetes =
        selector.filter(&FilterCriteria::any().with_vendors([Vendor::Kubernetes]), None);
    assert_eq!(kubernetes.len(), vigil_policies_kubernetes::all_policies().len());
}

// Registers a couple of aws-prefixed names by hand so this crate does not
// need a dev-dependency on the AWS pack.
fn vigil_policies_aws_smoke(registry: &PolicyRegistry) {
    use vigil_core::{PolicyMetadata, PolicyRecord, Severity};

    for name in ["aws-smoke-policy-one", "aws-smoke-policy-two"] {
        registry
            .register(PolicyRecord::new(
                name,
                "smoke record",
                PolicyMetadata::new(Vendor::Aws, Severity::Low),
                Arc::new(|_, _| {}),
            ))
            .unwrap();
    }
}

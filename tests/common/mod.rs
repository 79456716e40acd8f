//! Common test utilities
#![allow(dead_code)]

use std::sync::Once;

use warding::domain::role::{RecordId, Requester, Role};
use warding::domain::verb::Verb;
use warding::domain::{to_lookup, FeatureValue};

static TRACING_INIT: Once = Once::new();

/// Install a test subscriber once per process.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warding=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn fv(feature: &str, traits: &[&str], verbs: &[Verb]) -> FeatureValue {
    FeatureValue {
        feature: feature.to_string(),
        traits: traits.iter().map(|s| s.to_string()).collect(),
        verbs: verbs.to_vec(),
    }
}

pub fn role_with(fvs: &[FeatureValue]) -> Role {
    Role {
        id: Some(RecordId::from("r-test")),
        name: "tester".to_string(),
        features: fvs.to_vec(),
        lookup: to_lookup(fvs),
    }
}

pub fn requester(id: &str, roles: Vec<Role>) -> Requester {
    Requester {
        id: RecordId::from(id),
        active: true,
        roles,
    }
}

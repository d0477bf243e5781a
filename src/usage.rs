use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::kubernetes::{ObjectLister, WORKLOAD_KINDS, WorkloadKind};
use crate::scanner;
use crate::tags::image_stream_tag_name;
use crate::types::Resource;

/// Finds out which names are referenced by live workloads in a namespace.
#[derive(Clone)]
pub struct UsageResolver {
    lister: Arc<dyn ObjectLister>,
    kinds: &'static [WorkloadKind],
}

impl UsageResolver {
    pub fn new(lister: Arc<dyn ObjectLister>) -> Self {
        Self {
            lister,
            kinds: WORKLOAD_KINDS,
        }
    }

    /// Return the subset of `candidates` that appears in at least one workload.
    ///
    /// Each kind is listed once. A candidate found in one kind is not searched
    /// for again. A listing failure fails the whole call; unresolved candidates
    /// must not be treated as unused.
    pub async fn used_set(
        &self,
        namespace: &str,
        candidates: &[String],
    ) -> Result<BTreeSet<String>> {
        let mut used = BTreeSet::new();
        if candidates.is_empty() {
            return Ok(used);
        }

        for kind in self.kinds {
            if used.len() == candidates.len() {
                break;
            }
            let objects = self
                .lister
                .list(namespace, kind, None)
                .await
                .map_err(|source| Error::Collaborator {
                    namespace: namespace.to_string(),
                    kind: kind.to_string(),
                    source,
                })?;
            debug!("Scanning {} {} in namespace {}", objects.len(), kind, namespace);

            for candidate in candidates {
                if used.contains(candidate) {
                    continue;
                }
                if objects.iter().any(|obj| scanner::contains(obj, candidate)) {
                    debug!("{} is referenced by {}", candidate, kind);
                    used.insert(candidate.clone());
                }
            }
        }
        Ok(used)
    }

    /// Tags of `image_stream` that are referenced as `<image_stream>:<tag>`.
    pub async fn active_image_tags(
        &self,
        namespace: &str,
        image_stream: &str,
        tags: &[String],
    ) -> Result<Vec<String>> {
        let references: Vec<String> = tags
            .iter()
            .map(|tag| image_stream_tag_name(image_stream, tag))
            .collect();
        let used = self.used_set(namespace, &references).await?;
        let active: Vec<String> = tags
            .iter()
            .zip(&references)
            .filter(|(_, reference)| used.contains(*reference))
            .map(|(tag, _)| tag.clone())
            .collect();
        debug!("Found currently active image tags: {:?}", active);
        Ok(active)
    }

    /// Resources whose name does not appear in any workload, order preserved.
    pub async fn unused_resources(
        &self,
        namespace: &str,
        resources: &[Resource],
    ) -> Result<Vec<Resource>> {
        let names: Vec<String> = resources.iter().map(|r| r.name.clone()).collect();
        let used = self.used_set(namespace, &names).await?;
        Ok(resources
            .iter()
            .filter(|r| !used.contains(&r.name))
            .cloned()
            .collect())
    }
}

/// Resources created strictly before `older_than`. Resources without a
/// creation time are kept out.
pub fn filter_resources_by_age(resources: &[Resource], older_than: DateTime<Utc>) -> Vec<Resource> {
    resources
        .iter()
        .filter(|r| r.created.is_some_and(|created| created < older_than))
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::ResourceKind;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    /// In-memory lister keyed by (namespace, plural).
    #[derive(Default)]
    pub(crate) struct FakeLister {
        pub objects: HashMap<(String, String), Vec<Value>>,
        pub failing: Option<&'static str>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeLister {
        pub fn with(mut self, namespace: &str, plural: &str, obj: Value) -> Self {
            self.objects
                .entry((namespace.to_string(), plural.to_string()))
                .or_default()
                .push(obj);
            self
        }
    }

    #[async_trait]
    impl ObjectLister for FakeLister {
        async fn list(
            &self,
            namespace: &str,
            kind: &WorkloadKind,
            label_selector: Option<&str>,
        ) -> anyhow::Result<Vec<Value>> {
            self.calls.lock().unwrap().push(kind.to_string());
            if self.failing == Some(kind.plural) {
                anyhow::bail!("listing {} is forbidden", kind.plural);
            }
            let objects = self
                .objects
                .get(&(namespace.to_string(), kind.plural.to_string()))
                .cloned()
                .unwrap_or_default();
            Ok(match label_selector {
                Some(selector) => objects
                    .into_iter()
                    .filter(|obj| matches_labels(obj, selector))
                    .collect(),
                None => objects,
            })
        }
    }

    fn matches_labels(obj: &Value, selector: &str) -> bool {
        selector.split(',').all(|pair| match pair.split_once('=') {
            Some((k, v)) => obj.pointer(&format!("/metadata/labels/{}", k)) == Some(&json!(v)),
            None => false,
        })
    }

    pub(crate) fn pod(name: &str, image: &str) -> Value {
        json!({
            "metadata": {"name": name},
            "spec": {"containers": [{"name": "app", "image": image}]}
        })
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn resource(name: &str, created: Option<DateTime<Utc>>) -> Resource {
        Resource {
            kind: ResourceKind::ConfigMap,
            name: name.to_string(),
            namespace: "ns".to_string(),
            created,
            labels: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_active_image_tags() {
        let lister = FakeLister::default()
            .with("ns", "pods", pod("web-1", "docker-registry/ns/app:v2"))
            .with(
                "ns",
                "deploymentconfigs",
                json!({"spec": {"triggers": [{"imageChangeParams": {"from": {"name": "app:v3"}}}]}}),
            );
        let resolver = UsageResolver::new(Arc::new(lister));
        let active = resolver
            .active_image_tags("ns", "app", &strings(&["v1", "v2", "v3"]))
            .await
            .unwrap();
        assert_eq!(active, strings(&["v2", "v3"]));
    }

    #[tokio::test]
    async fn test_used_set_ignores_other_namespaces() {
        let lister = FakeLister::default().with("other", "pods", pod("p", "app:v1"));
        let resolver = UsageResolver::new(Arc::new(lister));
        let used = resolver.used_set("ns", &strings(&["app:v1"])).await.unwrap();
        assert!(used.is_empty());
    }

    #[tokio::test]
    async fn test_used_set_without_candidates_lists_nothing() {
        let lister = Arc::new(FakeLister::default());
        let resolver = UsageResolver::new(lister.clone());
        assert!(resolver.used_set("ns", &[]).await.unwrap().is_empty());
        assert!(lister.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_used_set_stops_listing_once_everything_is_used() {
        let lister = Arc::new(FakeLister::default().with("ns", "pods", pod("p", "app:v1")));
        let resolver = UsageResolver::new(lister.clone());
        let used = resolver.used_set("ns", &strings(&["app:v1"])).await.unwrap();
        assert!(used.contains("app:v1"));
        assert_eq!(*lister.calls.lock().unwrap(), strings(&["v1/pods"]));
    }

    #[tokio::test]
    async fn test_used_set_fails_whole_batch_on_listing_error() {
        let lister = FakeLister {
            failing: Some("deploymentconfigs"),
            ..Default::default()
        }
        .with("ns", "pods", pod("p", "app:v1"));
        let resolver = UsageResolver::new(Arc::new(lister));
        let err = resolver
            .used_set("ns", &strings(&["app:v1", "app:v2"]))
            .await
            .unwrap_err();
        match err {
            Error::Collaborator { namespace, kind, .. } => {
                assert_eq!(namespace, "ns");
                assert_eq!(kind, "apps.openshift.io/v1/deploymentconfigs");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unused_resources() {
        let lister = FakeLister::default().with(
            "ns",
            "deployments",
            json!({"spec": {"template": {"spec": {"volumes": [{"configMap": {"name": "app-config"}}]}}}}),
        );
        let resolver = UsageResolver::new(Arc::new(lister));
        let resources = vec![resource("app-config", None), resource("stale-config", None)];
        let unused = resolver.unused_resources("ns", &resources).await.unwrap();
        assert_eq!(unused, vec![resource("stale-config", None)]);
    }

    #[test]
    fn test_filter_resources_by_age() {
        let now = Utc::now();
        let old = resource("old", Some(now - chrono::Duration::days(10)));
        let fresh = resource("fresh", Some(now - chrono::Duration::hours(1)));
        let unknown = resource("unknown", None);
        let filtered = filter_resources_by_age(
            &[old.clone(), fresh, unknown],
            now - chrono::Duration::days(7),
        );
        assert_eq!(filtered, vec![old]);
    }
}

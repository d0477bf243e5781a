use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{ApiResource, DeleteParams, DynamicObject, ListParams};
use kube::{Api, Client, ResourceExt, config};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

use crate::namespace::IDLE_SINCE_ANNOTATION;
use crate::types::{NamespaceRecord, Resource, ResourceKind, TagEventHistory};

/// A namespaced API resource, addressed by group/version and plural name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadKind {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
}

impl WorkloadKind {
    pub const fn new(
        group: &'static str,
        version: &'static str,
        kind: &'static str,
        plural: &'static str,
    ) -> Self {
        Self {
            group,
            version,
            kind,
            plural,
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.to_string(),
            version: self.version.to_string(),
            api_version: self.api_version(),
            kind: self.kind.to_string(),
            plural: self.plural.to_string(),
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.plural)
    }
}

/// Every kind whose objects may reference an image tag, ConfigMap or Secret.
pub const WORKLOAD_KINDS: &[WorkloadKind] = &[
    WorkloadKind::new("", "v1", "Pod", "pods"),
    WorkloadKind::new("apps", "v1", "StatefulSet", "statefulsets"),
    WorkloadKind::new("apps", "v1", "Deployment", "deployments"),
    WorkloadKind::new("apps.openshift.io", "v1", "DeploymentConfig", "deploymentconfigs"),
    WorkloadKind::new("batch", "v1beta1", "CronJob", "cronjobs"),
    WorkloadKind::new("extensions", "v1beta1", "DaemonSet", "daemonsets"),
    WorkloadKind::new("extensions", "v1beta1", "Deployment", "deployments"),
    WorkloadKind::new("extensions", "v1beta1", "ReplicaSet", "replicasets"),
];

pub const IMAGE_STREAM: WorkloadKind =
    WorkloadKind::new("image.openshift.io", "v1", "ImageStream", "imagestreams");

pub const IMAGE_STREAM_TAG: WorkloadKind =
    WorkloadKind::new("image.openshift.io", "v1", "ImageStreamTag", "imagestreamtags");

pub const SECRET: WorkloadKind = WorkloadKind::new("", "v1", "Secret", "secrets");

/// Lists live objects of a kind as untyped JSON.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    async fn list(
        &self,
        namespace: &str,
        kind: &WorkloadKind,
        label_selector: Option<&str>,
    ) -> anyhow::Result<Vec<Value>>;
}

/// [`ObjectLister`] backed by the dynamic kube API.
#[derive(Clone)]
pub struct KubeLister {
    client: Client,
}

impl KubeLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectLister for KubeLister {
    async fn list(
        &self,
        namespace: &str,
        kind: &WorkloadKind,
        label_selector: Option<&str>,
    ) -> anyhow::Result<Vec<Value>> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &kind.api_resource());
        let mut lp = ListParams::default();
        if let Some(selector) = label_selector {
            lp = lp.labels(selector);
        }
        debug!("Listing {} in namespace {}", kind, namespace);
        match api.list(&lp).await {
            Ok(list) => list
                .items
                .iter()
                .map(|obj| serde_json::to_value(obj).map_err(anyhow::Error::from))
                .collect(),
            Err(kube::Error::Api(err)) if err.code == 404 => {
                // kind not served by the cluster, nothing can reference through it
                debug!("{} is not served by this cluster, skipping", kind);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub async fn initialize_client(context: Option<&str>) -> anyhow::Result<Client> {
    let config = match context {
        Some(ctx) => config::Config::from_kubeconfig(&config::KubeConfigOptions {
            context: Some(ctx.to_string()),
            ..Default::default()
        })
        .await
        .map_err(|e| anyhow::anyhow!("Context '{}' not found in kubeconfig: {}", ctx, e))?,
        None => config::Config::infer().await?,
    };
    let client = Client::try_from(config)?;
    info!("Using namespace {} by default", client.default_namespace());
    Ok(client)
}

pub async fn list_image_streams(client: &Client, namespace: &str) -> anyhow::Result<Vec<String>> {
    let api: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), namespace, &IMAGE_STREAM.api_resource());
    let list = api.list(&ListParams::default()).await?;
    Ok(list.items.iter().map(|is| is.name_any()).collect())
}

/// Read the tag history recorded in an image stream's status.
pub async fn get_image_stream_tags(
    client: &Client,
    namespace: &str,
    image_stream: &str,
) -> anyhow::Result<Vec<TagEventHistory>> {
    let api: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), namespace, &IMAGE_STREAM.api_resource());
    let is = api.get(image_stream).await?;
    tag_histories_from_status(&is.data)
}

fn tag_histories_from_status(data: &Value) -> anyhow::Result<Vec<TagEventHistory>> {
    let Some(tags) = data.pointer("/status/tags").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut histories = Vec::with_capacity(tags.len());
    for entry in tags {
        let tag = entry
            .get("tag")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("Image stream tag entry without a name"))?;
        let mut created = Vec::new();
        for item in entry
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
        {
            if let Some(ts) = item.get("created").and_then(Value::as_str) {
                let parsed = DateTime::parse_from_rfc3339(ts).map_err(|e| {
                    anyhow::anyhow!("Tag {} has invalid creation time {}: {}", tag, ts, e)
                })?;
                created.push(parsed.with_timezone(&Utc));
            }
        }
        histories.push(TagEventHistory {
            tag: tag.to_string(),
            created,
        });
    }
    Ok(histories)
}

pub async fn list_resources(
    client: &Client,
    kind: ResourceKind,
    namespace: &str,
    label_selector: Option<&str>,
) -> anyhow::Result<Vec<Resource>> {
    let mut lp = ListParams::default();
    if let Some(selector) = label_selector {
        lp = lp.labels(selector);
    }
    let metas = match kind {
        ResourceKind::ConfigMap => {
            let api: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
            api.list(&lp)
                .await?
                .items
                .into_iter()
                .map(|cm| cm.metadata)
                .collect::<Vec<_>>()
        }
        ResourceKind::Secret => {
            let api: Api<Secret> = Api::namespaced(client.clone(), namespace);
            api.list(&lp)
                .await?
                .items
                .into_iter()
                .map(|s| s.metadata)
                .collect::<Vec<_>>()
        }
    };

    Ok(metas
        .into_iter()
        .map(|meta| Resource {
            kind,
            created: creation_time(&meta),
            name: meta.name.unwrap_or_default(),
            namespace: meta.namespace.unwrap_or_else(|| namespace.to_string()),
            labels: meta.labels.unwrap_or_default(),
        })
        .collect())
}

/// Creation time via its wire form, which is RFC 3339 regardless of the
/// time type k8s-openapi wraps.
fn creation_time(meta: &ObjectMeta) -> Option<DateTime<Utc>> {
    let raw = serde_json::to_value(meta.creation_timestamp.as_ref()?).ok()?;
    DateTime::parse_from_rfc3339(raw.as_str()?)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

pub async fn list_namespaces(
    client: &Client,
    label_selector: Option<&str>,
) -> anyhow::Result<Vec<NamespaceRecord>> {
    let api: Api<Namespace> = Api::all(client.clone());
    let mut lp = ListParams::default();
    if let Some(selector) = label_selector {
        lp = lp.labels(selector);
    }
    Ok(api
        .list(&lp)
        .await?
        .items
        .iter()
        .map(|ns| {
            NamespaceRecord::new(
                ns.name_any(),
                ns.annotations().get(IDLE_SINCE_ANNOTATION).cloned(),
            )
        })
        .collect())
}

pub async fn delete_image_stream_tag(
    client: &Client,
    namespace: &str,
    name: &str,
) -> anyhow::Result<()> {
    let api: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), namespace, &IMAGE_STREAM_TAG.api_resource());
    api.delete(name, &DeleteParams::default()).await?;
    Ok(())
}

pub async fn delete_resource(client: &Client, resource: &Resource) -> anyhow::Result<()> {
    let dp = DeleteParams::default();
    match resource.kind {
        ResourceKind::ConfigMap => {
            let api: Api<ConfigMap> = Api::namespaced(client.clone(), &resource.namespace);
            api.delete(&resource.name, &dp).await?;
        }
        ResourceKind::Secret => {
            let api: Api<Secret> = Api::namespaced(client.clone(), &resource.namespace);
            api.delete(&resource.name, &dp).await?;
        }
    }
    Ok(())
}

pub async fn delete_namespace(client: &Client, name: &str) -> anyhow::Result<()> {
    let api: Api<Namespace> = Api::all(client.clone());
    api.delete(name, &DeleteParams::default()).await?;
    Ok(())
}

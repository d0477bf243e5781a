pub mod history;
pub mod namespaces;
pub mod orphans;
pub mod resources;

use kube::Client;
use std::sync::Arc;
use tracing::{error, info};

use crate::kubernetes::{self, KubeLister, ObjectLister};
use crate::output::OutputFormat;
use crate::tags::image_stream_tag_name;
use crate::usage::UsageResolver;

/// Everything a command needs to talk to the cluster.
#[derive(Clone)]
pub struct CommandContext {
    pub client: Client,
    pub lister: Arc<dyn ObjectLister>,
    pub namespace: String,
    pub output: OutputFormat,
}

impl CommandContext {
    pub fn new(client: Client, namespace: Option<String>, output: OutputFormat) -> Self {
        let namespace = namespace.unwrap_or_else(|| client.default_namespace().to_string());
        Self {
            lister: Arc::new(KubeLister::new(client.clone())),
            client,
            namespace,
            output,
        }
    }

    pub fn resolver(&self) -> UsageResolver {
        UsageResolver::new(self.lister.clone())
    }
}

pub(crate) async fn list_image_streams(ctx: &CommandContext) -> anyhow::Result<()> {
    let images = kubernetes::list_image_streams(&ctx.client, &ctx.namespace).await?;
    info!(
        "Please select an image. Image streams in namespace {}: {}",
        ctx.namespace,
        images.join(", ")
    );
    Ok(())
}

/// Delete image stream tags one by one, logging failures without stopping.
pub(crate) async fn delete_image_tags(ctx: &CommandContext, image: &str, tags: &[String]) {
    for tag in tags {
        let name = image_stream_tag_name(image, tag);
        match kubernetes::delete_image_stream_tag(&ctx.client, &ctx.namespace, &name).await {
            Ok(()) => info!("Deleted image tag {}/{}", ctx.namespace, name),
            Err(e) => error!("Failed to delete image tag {}/{}: {}", ctx.namespace, name, e),
        }
    }
}

use chrono::Utc;
use tracing::{error, info};

use super::CommandContext;
use crate::cli::ResourceArgs;
use crate::config::{label_selector, older_than};
use crate::kubernetes::{delete_resource, list_resources};
use crate::output::print_resources;
use crate::types::{Resource, ResourceKind};
use crate::usage::filter_resources_by_age;

/// Report, and optionally delete, unused ConfigMaps or Secrets.
///
/// Without a label selector nothing is evaluated; the available resources
/// and their labels are listed so one can be picked.
pub async fn run(
    ctx: &CommandContext,
    kind: ResourceKind,
    args: &ResourceArgs,
) -> anyhow::Result<()> {
    let namespace = args
        .target_namespace
        .clone()
        .unwrap_or_else(|| ctx.namespace.clone());
    let threshold = older_than(&args.older_than, Utc::now())?;

    let Some(selector) = label_selector(&args.labels) else {
        let resources = list_resources(&ctx.client, kind, &namespace, None).await?;
        let (names, labels) = names_and_labels(&resources);
        info!(
            "Please use labels to select {} resources. Available in namespace {}: [{}], labels: [{}]",
            kind,
            namespace,
            names.join(", "),
            labels.join(", ")
        );
        return Ok(());
    };

    let resources = list_resources(&ctx.client, kind, &namespace, Some(selector.as_str())).await?;
    info!(
        "Found {} {} resources in namespace {}",
        resources.len(),
        kind,
        namespace
    );

    let unused = ctx.resolver().unused_resources(&namespace, &resources).await?;
    let candidates = filter_resources_by_age(&unused, threshold);

    print_resources(ctx.output, &candidates, args.delete.delete)?;
    if args.delete.delete {
        for resource in &candidates {
            match delete_resource(&ctx.client, resource).await {
                Ok(()) => info!("Deleted {} {}/{}", kind, resource.namespace, resource.name),
                Err(e) => error!(
                    "Failed to delete {} {}/{}: {}",
                    kind, resource.namespace, resource.name, e
                ),
            }
        }
    }
    Ok(())
}

/// Resource names in order, plus every distinct `key=value` label in first-seen order.
fn names_and_labels(resources: &[Resource]) -> (Vec<String>, Vec<String>) {
    let mut names = Vec::with_capacity(resources.len());
    let mut labels: Vec<String> = Vec::new();
    for resource in resources {
        names.push(resource.name.clone());
        for (key, value) in &resource.labels {
            let label = format!("{}={}", key, value);
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
    }
    (names, labels)
}

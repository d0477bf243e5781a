use tracing::{error, info};

use super::CommandContext;
use crate::cli::NamespaceArgs;
use crate::config::{label_selector, parse_duration};
use crate::kubernetes::{delete_namespace, list_namespaces};
use crate::namespace::{HELM_CHECKER_NAME, NamespaceService};
use crate::output::print_namespaces;

pub async fn run(ctx: &CommandContext, args: &NamespaceArgs) -> anyhow::Result<()> {
    let delete_after = parse_duration(&args.delete_after)?;
    let selector = label_selector(&args.labels);

    let mut service = NamespaceService::new(ctx.lister.clone());
    if args.no_helm {
        service = service.without_checker(HELM_CHECKER_NAME);
    }

    let namespaces = list_namespaces(&ctx.client, selector.as_deref()).await?;
    info!(
        "Evaluating {} namespaces with checkers {:?}",
        namespaces.len(),
        service.checker_names()
    );
    let empty = service.get_empty_for(&namespaces, delete_after).await?;

    print_namespaces(ctx.output, &empty, args.delete.delete)?;
    if args.delete.delete {
        for ns in &empty {
            match delete_namespace(&ctx.client, &ns.name).await {
                Ok(()) => info!("Deleted namespace {}", ns.name),
                Err(e) => error!("Failed to delete namespace {}: {}", ns.name, e),
            }
        }
    }
    Ok(())
}

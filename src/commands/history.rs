use tracing::info;

use super::{CommandContext, delete_image_tags, list_image_streams};
use crate::cli::HistoryArgs;
use crate::kubernetes::get_image_stream_tags;
use crate::output::print_image_tags;
use crate::tags::{MatchOption, inactive_tags, limit_tags, matching_tags};
use crate::vcs::GitRepository;

pub async fn run(ctx: &CommandContext, args: &HistoryArgs) -> anyhow::Result<()> {
    let Some(image) = args.image.as_deref() else {
        return list_image_streams(ctx).await;
    };

    let repo = GitRepository::new(&args.git.repo_path);
    let histories = get_image_stream_tags(&ctx.client, &ctx.namespace, image).await?;
    let image_tags: Vec<String> = histories.iter().map(|h| h.tag.clone()).collect();
    let resolver = ctx.resolver();

    let candidates = if args.git.tags {
        let git_tags = repo.tags(args.git.sort).await?;
        let matching = matching_tags(&git_tags, &image_tags, MatchOption::Exact);
        let superseded = limit_tags(&matching, args.keep);
        let active = resolver
            .active_image_tags(&ctx.namespace, image, &superseded)
            .await?;
        inactive_tags(&superseded, &active)
    } else {
        let commits = repo.commit_hashes(args.git.commit_limit).await?;
        let matching = matching_tags(&commits, &image_tags, MatchOption::Prefix);
        let active = resolver
            .active_image_tags(&ctx.namespace, image, &matching)
            .await?;
        limit_tags(&inactive_tags(&matching, &active), args.keep)
    };

    info!(
        "Found {} image tag candidates for {}/{}",
        candidates.len(),
        ctx.namespace,
        image
    );
    print_image_tags(ctx.output, image, &candidates, args.delete.delete)?;
    if args.delete.delete {
        delete_image_tags(ctx, image, &candidates).await;
    }
    Ok(())
}

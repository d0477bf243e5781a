use chrono::Utc;
use tracing::info;

use super::{CommandContext, delete_image_tags, list_image_streams};
use crate::cli::OrphanArgs;
use crate::config::{deletion_pattern, older_than};
use crate::kubernetes::get_image_stream_tags;
use crate::output::print_image_tags;
use crate::tags::{MatchOption, filter_by_age, filter_by_regex, inactive_tags, orphan_tags};
use crate::types::TagEventHistory;
use crate::vcs::GitRepository;

pub async fn run(ctx: &CommandContext, args: &OrphanArgs) -> anyhow::Result<()> {
    let Some(image) = args.image.as_deref() else {
        return list_image_streams(ctx).await;
    };

    // validate before touching the cluster
    let pattern = deletion_pattern(&args.deletion_pattern)?;
    let threshold = older_than(&args.older_than, Utc::now())?;

    let repo = GitRepository::new(&args.git.repo_path);
    let (references, option) = if args.git.tags {
        (repo.tags(args.git.sort).await?, MatchOption::Exact)
    } else {
        (
            repo.commit_hashes(args.git.commit_limit).await?,
            MatchOption::Prefix,
        )
    };

    let histories = get_image_stream_tags(&ctx.client, &ctx.namespace, image).await?;
    let image_tags: Vec<String> = histories.iter().map(|h| h.tag.clone()).collect();

    let orphans = orphan_tags(&references, &image_tags, option);
    let deletable = filter_by_regex(&orphans, &pattern);
    let deletable_histories: Vec<TagEventHistory> = histories
        .into_iter()
        .filter(|h| deletable.contains(&h.tag))
        .collect();
    let old = filter_by_age(&deletable_histories, threshold);

    let active = ctx
        .resolver()
        .active_image_tags(&ctx.namespace, image, &old)
        .await?;
    let candidates = inactive_tags(&old, &active);

    info!(
        "Found {} orphan image tag candidates for {}/{}",
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

use anyhow::Context;
use pw_core::{NewPost, Post, PostVariation, UsageStats};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::GenerateArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct GenerateResponse {
    prompt: String,
    requested: u8,
    variations: Vec<PostVariation>,
    saved: Vec<Post>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<UsageStats>,
}

/// Handle `pwt generate`.
///
/// Saved variations are published one at a time, in index order; the first
/// failure stops the rest.
pub async fn handle(args: &GenerateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.save.contains(&0) {
        anyhow::bail!("--save indexes start at 1");
    }
    let saving = args.save_all || !args.save.is_empty();
    if !saving && !args.tag.is_empty() {
        tracing::warn!("--tag has no effect without --save or --save-all");
    }

    let requested = args.count.unwrap_or(ctx.config.generation.variation_count);
    let variations = ctx
        .pipeline
        .generate_variations(&args.prompt, requested)
        .await?;

    let prompt = args.prompt.trim().to_string();
    let mut saved = Vec::new();
    let mut stats = None;
    for variation in select_variations(&variations, &args.save, args.save_all)? {
        let post = NewPost::new(variation.content.clone(), prompt.clone()).with_tags(args.tag.clone());
        let (post, latest) = ctx
            .service
            .publish(post)
            .await
            .with_context(|| format!("failed to save variation {}", variation.index))?;
        saved.push(post);
        stats = Some(latest);
    }

    output(
        &GenerateResponse {
            prompt,
            requested,
            variations,
            saved,
            stats,
        },
        flags.format,
    )
}

/// Variations to save, in index order, each at most once.
fn select_variations<'a>(
    variations: &'a [PostVariation],
    save: &[usize],
    save_all: bool,
) -> anyhow::Result<Vec<&'a PostVariation>> {
    if save_all {
        return Ok(variations.iter().collect());
    }
    for index in save {
        if !variations.iter().any(|v| v.index == *index) {
            anyhow::bail!(
                "--save {index}: only {} variation(s) were generated",
                variations.len()
            );
        }
    }
    Ok(variations.iter().filter(|v| save.contains(&v.index)).collect())
}

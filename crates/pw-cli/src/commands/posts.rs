use pw_core::Post;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::PostCommands;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct PostListResponse {
    posts: Vec<Post>,
}

/// Handle `pwt posts`.
pub async fn handle(action: &PostCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        PostCommands::List => {
            let limit = effective_limit(flags.limit, ctx.config.general.default_limit);
            let posts = ctx.service.list_posts(limit).await?;
            output(&PostListResponse { posts }, flags.format)
        }
        PostCommands::Get { id } => {
            let post = ctx
                .service
                .get_post(id)
                .await
                .map_err(|error| match error {
                    pw_db::error::DatabaseError::NoResult => anyhow::anyhow!("post '{id}' not found"),
                    other => other.into(),
                })?;
            output(&post, flags.format)
        }
    }
}

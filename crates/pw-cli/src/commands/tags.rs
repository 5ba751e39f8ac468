use pw_core::Tag;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TagCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct TagListResponse {
    tags: Vec<Tag>,
}

/// Handle `pwt tags`.
pub async fn handle(action: &TagCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        TagCommands::List => {
            let tags = ctx.service.list_tags().await?;
            output(&TagListResponse { tags }, flags.format)
        }
        TagCommands::Create { name, color } => {
            let tag = ctx.service.create_tag(name, color.as_deref()).await?;
            output(&tag, flags.format)
        }
    }
}

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `pwt stats`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let stats = ctx.service.read_stats().await?;
    output(&stats, flags.format)
}

use anyhow::Context;
use pw_auth::BridgeState;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    signed_out: bool,
    bridge: BridgeState,
}

/// Sign out of Clerk, forget the stored token, and drop the backend session.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(clerk) = &ctx.clerk else {
        anyhow::bail!("auth logout needs Clerk; without it, pwt always runs as the local user");
    };
    clerk.sign_out().context("failed to remove the stored identity token")?;

    let bridge = match ctx.bridge.on_identity_change(None).await {
        Ok(state) => state,
        Err(error) => {
            tracing::warn!(%error, "backend sign-out did not complete");
            ctx.bridge.state()
        }
    };
    output(
        &AuthLogoutResponse {
            signed_out: true,
            bridge,
        },
        flags.format,
    )
}

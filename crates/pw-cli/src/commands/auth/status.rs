use pw_auth::{BridgeState, SecretSlot};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    mode: &'static str,
    authenticated: bool,
    user_id: Option<String>,
    expires_at: Option<String>,
    token_source: Option<&'static str>,
    bridge: BridgeState,
}

/// Who is signed in, and whether the data store accepted the session.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let user_id = ctx.identity.current_user_id();
    let status = if ctx.clerk.is_some() {
        let slot = SecretSlot::IDENTITY_TOKEN;
        let expires_at = user_id
            .as_ref()
            .and(slot.load())
            .and_then(|jwt| pw_auth::refresh::decode_expiry(&jwt).ok())
            .map(|at| at.to_rfc3339());
        AuthStatusResponse {
            mode: "clerk",
            authenticated: user_id.is_some(),
            user_id,
            expires_at,
            token_source: slot.detect_source().map(pw_auth::SecretSource::as_str),
            bridge: ctx.bridge.state(),
        }
    } else {
        AuthStatusResponse {
            mode: "local",
            authenticated: user_id.is_some(),
            user_id,
            expires_at: None,
            token_source: None,
            bridge: ctx.bridge.state(),
        }
    };
    output(&status, flags.format)
}

use std::time::Duration;

use pw_auth::ClerkIdentity;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthLoginArgs;
use crate::output::output;

const BROWSER_LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct AuthLoginResponse {
    authenticated: bool,
    user_id: String,
    session_id: Option<String>,
    expires_at: String,
}

pub async fn handle(
    args: &AuthLoginArgs,
    flags: &GlobalFlags,
    config: &pw_config::PwConfig,
) -> anyhow::Result<()> {
    if config.clerk.secret_key.is_empty() {
        return Err(anyhow::Error::from(pw_config::ConfigError::NotConfigured {
            section: "clerk".into(),
        })
        .context("auth login needs POSTWRIGHT_CLERK__SECRET_KEY; without Clerk, pwt runs as the local user"));
    }

    let clerk = ClerkIdentity::new(
        config.clerk.secret_key.clone(),
        config.clerk.template().map(str::to_string),
    );
    let claims = if args.api_key {
        let user_id = args
            .user_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("auth login --api-key requires --user-id"))?;
        clerk.sign_in_with_secret_key(user_id).await?
    } else {
        let frontend_api = resolve_frontend_api(&config.clerk)?;
        clerk
            .sign_in_with_browser(&frontend_api, BROWSER_LOGIN_TIMEOUT)
            .await?
    };

    output(
        &AuthLoginResponse {
            authenticated: true,
            user_id: claims.user_id,
            session_id: claims.session_id,
            expires_at: claims.expires_at.to_rfc3339(),
        },
        flags.format,
    )
}

/// Clerk frontend API host: `clerk.frontend_url` if set, else the host of
/// `clerk.jwks_url`.
fn resolve_frontend_api(clerk: &pw_config::ClerkConfig) -> anyhow::Result<String> {
    let source = if clerk.frontend_url.is_empty() {
        clerk.jwks_url.as_str()
    } else {
        clerk.frontend_url.as_str()
    };
    if source.is_empty() {
        anyhow::bail!(
            "cannot determine Clerk frontend URL: set POSTWRIGHT_CLERK__FRONTEND_URL or POSTWRIGHT_CLERK__JWKS_URL"
        );
    }

    let host = source
        .strip_prefix("https://")
        .or_else(|| source.strip_prefix("http://"))
        .unwrap_or(source)
        .split('/')
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if host.is_empty() {
        anyhow::bail!("invalid Clerk URL '{source}'");
    }

    // Dev instances answer sign-in on `<slug>.accounts.dev`.
    Ok(host
        .strip_suffix(".clerk.accounts.dev")
        .map_or_else(|| host.to_string(), |slug| format!("{slug}.accounts.dev")))
}

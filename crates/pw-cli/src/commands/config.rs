use pw_auth::SecretSlot;
use pw_config::PwConfig;
use serde::Serialize;
use serde_json::Value;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ConfigCommands;
use crate::output::output;

#[derive(Serialize)]
struct ApiKeyResponse {
    stored: bool,
    source: Option<&'static str>,
}

/// Handle `pwt config`.
pub fn handle(action: &ConfigCommands, flags: &GlobalFlags, config: &PwConfig) -> anyhow::Result<()> {
    let slot = SecretSlot::GENERATION_API_KEY;
    match action {
        ConfigCommands::SetApiKey { key } => {
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("config set-api-key: key must not be empty");
            }
            slot.store(key)?;
            output(
                &ApiKeyResponse {
                    stored: true,
                    source: slot.detect_source().map(pw_auth::SecretSource::as_str),
                },
                flags.format,
            )
        }
        ConfigCommands::ClearApiKey => {
            slot.delete()?;
            output(
                &ApiKeyResponse {
                    stored: false,
                    source: None,
                },
                flags.format,
            )
        }
        ConfigCommands::Show => {
            let source = slot
                .detect_source()
                .map(pw_auth::SecretSource::as_str)
                .or_else(|| config.generation.has_api_key().then_some("config"));
            output(&masked_config(config, source)?, flags.format)
        }
    }
}

const SECRET_FIELDS: &[(&str, &str)] = &[
    ("clerk", "secret_key"),
    ("clerk", "publishable_key"),
    ("generation", "api_key"),
];

/// The effective configuration as JSON with secrets masked.
fn masked_config(config: &PwConfig, api_key_source: Option<&str>) -> anyhow::Result<Value> {
    let mut value = serde_json::to_value(config)?;
    for (section, field) in SECRET_FIELDS {
        if let Some(Value::String(secret)) = value.get_mut(*section).and_then(|s| s.get_mut(*field)) {
            *secret = mask(secret);
        }
    }
    if let Some(Value::Object(generation)) = value.get_mut("generation") {
        generation.insert(
            "api_key_source".into(),
            api_key_source.map_or(Value::Null, |s| Value::String(s.into())),
        );
    }
    Ok(value)
}

/// Keep a short prefix so keys stay recognisable.
fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let count = secret.chars().count();
    if count <= 8 {
        return "*".repeat(count);
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}****")
}

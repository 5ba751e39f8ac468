use pw_config::PwConfig;

/// Emit warnings for likely mistyped env var keys and inconsistent settings.
pub fn warn_unconfigured(config: &PwConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &PwConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    if !config.turso.is_configured() && has_env_prefix(&env_keys, "POSTWRIGHT_TURSO") {
        warnings.push(
            "Turso config appears default while POSTWRIGHT_TURSO* env vars exist. Use double underscores (example: POSTWRIGHT_TURSO__URL)."
                .to_string(),
        );
    }

    if !config.clerk.is_configured() && has_env_prefix(&env_keys, "POSTWRIGHT_CLERK") {
        warnings.push(
            "Clerk config appears default while POSTWRIGHT_CLERK* env vars exist. Use double underscores (example: POSTWRIGHT_CLERK__SECRET_KEY)."
                .to_string(),
        );
    }

    if config.turso.is_configured() && !config.clerk.is_configured() {
        warnings.push(
            "Turso is configured but Clerk is not. The remote database needs a Clerk JWT, so every store command will fail."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}

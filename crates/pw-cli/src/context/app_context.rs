use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use pw_auth::{ClerkIdentity, IdentityProvider, LocalIdentity, SessionBridge};
use pw_config::PwConfig;
use pw_db::service::{PwService, RemoteTarget};
use pw_generate::GenerationPipeline;

use super::{KeychainCredential, ServiceSessionStore};

pub type Bridge = SessionBridge<dyn IdentityProvider, ServiceSessionStore>;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: Arc<PwService>,
    pub config: PwConfig,
    pub identity: Arc<dyn IdentityProvider>,
    /// Set when Clerk is configured; `identity` is then the same provider.
    pub clerk: Option<Arc<ClerkIdentity>>,
    pub bridge: Arc<Bridge>,
    pub pipeline: GenerationPipeline,
}

impl AppContext {
    /// Open the store, restore the identity session, and bridge it to the store.
    ///
    /// A bridge failure is logged, not returned: store commands then fail
    /// with "not signed in" while generation keeps working.
    pub async fn init(project_root: &Path, config: PwConfig) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir(project_root, &config.general.data_dir);
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;
        let data_dir_str = data_dir.to_string_lossy();

        let service = match RemoteTarget::from_config(&config.turso, &data_dir_str) {
            Some(remote) => PwService::new_remote(remote).await,
            None => PwService::new_local(&data_dir.join("postwright.db").to_string_lossy()).await,
        }
        .context("failed to initialize pw-db service")?;
        let service = Arc::new(service);

        let clerk = build_clerk(&config).await;
        let identity: Arc<dyn IdentityProvider> = match &clerk {
            Some(clerk) => Arc::clone(clerk) as Arc<dyn IdentityProvider>,
            None => {
                tracing::debug!("clerk not configured; using local identity");
                Arc::new(LocalIdentity::new())
            }
        };
        let bridge: Arc<Bridge> = Arc::new(SessionBridge::new(
            Arc::clone(&identity),
            Arc::new(ServiceSessionStore(Arc::clone(&service))),
        ));

        match bridge.on_identity_change(identity.current_user_id()).await {
            Ok(state) => tracing::debug!(state = state.label(), "session bridged"),
            Err(error) => tracing::warn!(%error, "could not bridge identity to the data store"),
        }

        let credential = Arc::new(KeychainCredential::new(&config.generation.api_key));
        let pipeline = GenerationPipeline::from_config(&config.generation, credential);

        Ok(Self {
            service,
            config,
            identity,
            clerk,
            bridge,
            pipeline,
        })
    }
}

/// Relative data dirs live under the project root.
#[must_use]
pub fn resolve_data_dir(project_root: &Path, data_dir: &str) -> PathBuf {
    let data_dir = Path::new(data_dir);
    if data_dir.is_absolute() {
        data_dir.to_path_buf()
    } else {
        project_root.join(data_dir)
    }
}

/// Clerk with the stored token restored, when configured.
async fn build_clerk(config: &PwConfig) -> Option<Arc<ClerkIdentity>> {
    if !config.clerk.is_configured() {
        return None;
    }

    let clerk = ClerkIdentity::new(
        config.clerk.secret_key.clone(),
        config.clerk.template().map(str::to_string),
    );
    match clerk.restore().await {
        Ok(Some(claims)) => tracing::debug!(user_id = %claims.user_id, "restored clerk session"),
        Ok(None) => tracing::debug!("no stored clerk token; run `pwt auth login`"),
        Err(error) => tracing::warn!(%error, "stored clerk token rejected; run `pwt auth login`"),
    }
    Some(Arc::new(clerk))
}

use std::sync::Arc;

use anyhow::Context;

use scribe_auth::{
    AccountService, Authenticator, IdentityStore, PasswordHasher, SessionIssuer, TokenCodec,
};
use scribe_content::{ContentService, ContentStore};
use scribe_infra::{
    InMemoryContentStore, InMemoryIdentityStore, PostgresContentStore, PostgresIdentityStore, db,
};

use crate::config::AppConfig;

/// Long-lived services shared by every handler.
pub struct AppServices {
    pub accounts: AccountService,
    pub authenticator: Authenticator,
    pub issuer: SessionIssuer,
    pub content: ContentService,
}

pub struct Stores {
    pub identities: Arc<dyn IdentityStore>,
    pub content: Arc<dyn ContentStore>,
}

/// Postgres when `DATABASE_URL` is configured, in-memory otherwise.
pub async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    match &config.database_url {
        Some(url) => {
            let pool = db::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to DATABASE_URL")?;
            db::bootstrap_schema(&pool)
                .await
                .context("failed to bootstrap database schema")?;
            tracing::info!(max_connections = config.db_max_connections, "using postgres stores");

            Ok(Stores {
                identities: Arc::new(PostgresIdentityStore::new(pool.clone())),
                content: Arc::new(PostgresContentStore::new(pool)),
            })
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
            Ok(Stores {
                identities: Arc::new(InMemoryIdentityStore::new()),
                content: Arc::new(InMemoryContentStore::new()),
            })
        }
    }
}

pub async fn build_services(
    config: &AppConfig,
    codec: Arc<TokenCodec>,
    stores: Stores,
) -> anyhow::Result<AppServices> {
    let hasher = PasswordHasher::new(config.auth.bcrypt_cost).context("invalid bcrypt cost")?;

    let services = AppServices {
        accounts: AccountService::new(stores.identities.clone(), hasher),
        authenticator: Authenticator::new(stores.identities, hasher)
            .context("failed to prepare authenticator")?,
        issuer: SessionIssuer::new(codec, config.auth.token_ttl).context("invalid token TTL")?,
        content: ContentService::new(stores.content),
    };

    if let Some(admin) = config.bootstrap_admin.clone() {
        let username = admin.username.clone();
        match services
            .accounts
            .ensure_superuser(admin)
            .await
            .context("failed to create bootstrap superuser")?
        {
            Some(record) => tracing::info!(user_id = %record.id, %username, "bootstrap superuser created"),
            None => tracing::info!(%username, "bootstrap superuser already present"),
        }
    }

    Ok(services)
}

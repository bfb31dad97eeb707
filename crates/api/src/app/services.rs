use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use starter_auth::{PolicyEvaluator, Role, RsaTokenVerifier, TokenVerifier};
use starter_infra::{
    Config, IdentityStore, IdentitySynchronizer, InMemoryIdentityStore, PolicyStore,
    PostgresIdentityStore, PostgresPolicyStore, StaticPolicyStore, SyncFailurePolicy,
    fetch_public_key, load_enforcer, spawn_periodic_reload,
};

/// Everything the pipelines need, injected at construction.
#[derive(Clone)]
pub struct AppServices {
    pub verifier: Arc<dyn TokenVerifier>,
    pub synchronizer: IdentitySynchronizer,
    pub policy: Arc<dyn PolicyEvaluator>,
    /// Role evaluated for every authenticated subject.
    pub role: Role,
    pub sync_failure_policy: SyncFailurePolicy,
    pub allowed_origins: Vec<String>,
}

impl AppServices {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        identities: Arc<dyn IdentityStore>,
        policy: Arc<dyn PolicyEvaluator>,
    ) -> Self {
        Self {
            verifier,
            synchronizer: IdentitySynchronizer::new(identities),
            policy,
            role: Role::authenticated(),
            sync_failure_policy: SyncFailurePolicy::default(),
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_sync_failure_policy(mut self, policy: SyncFailurePolicy) -> Self {
        self.sync_failure_policy = policy;
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }
}

/// Startup wiring: fetch the public key, open stores, load the policy.
///
/// Every failure here is fatal to the process.
pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let key = fetch_public_key(&config.jwt_public_key_url, config.public_key_timeout)
        .await
        .context("fetching token public key")?;
    let verifier: Arc<dyn TokenVerifier> = Arc::new(RsaTokenVerifier::new(key));

    let (identities, rules): (Arc<dyn IdentityStore>, Arc<dyn PolicyStore>) =
        if config.use_persistent_stores {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(5))
                .connect(&config.database_url)
                .await
                .context("connecting to database")?;
            info!("using postgres identity and policy stores");
            (
                Arc::new(PostgresIdentityStore::new(pool.clone())),
                Arc::new(PostgresPolicyStore::new(pool)),
            )
        } else {
            warn!("USE_PERSISTENT_STORES is off; identities and policy are in memory");
            (
                Arc::new(InMemoryIdentityStore::new()),
                Arc::new(StaticPolicyStore::seeded()),
            )
        };

    let enforcer = Arc::new(
        load_enforcer(rules.as_ref())
            .await
            .context("loading policy rules")?,
    );

    if let Some(period) = config.policy_reload_interval {
        info!(period_secs = period.as_secs(), "periodic policy reload enabled");
        // runs for the life of the process
        let _reload = spawn_periodic_reload(rules, Arc::clone(&enforcer), period);
    }

    Ok(AppServices::new(verifier, identities, enforcer)
        .with_role(Role::new(config.default_role.clone()))
        .with_sync_failure_policy(config.sync_failure_policy)
        .with_allowed_origins(config.allowed_origins.clone()))
}

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use starter_auth::PolicyEnforcer;

use super::{PolicyStore, PolicyStoreError};

/// Build an enforcer from the store's current rules. Used at startup, where
/// a failure is fatal.
pub async fn load_enforcer(store: &dyn PolicyStore) -> Result<PolicyEnforcer, PolicyStoreError> {
    let rules = store.load_rules().await?;
    info!(rules = rules.len(), "policy loaded");
    Ok(PolicyEnforcer::new(rules))
}

/// Load the rules again and swap them into `enforcer`. On any error the
/// previous snapshot stays in place. Returns the new rule count.
pub async fn reload(
    store: &dyn PolicyStore,
    enforcer: &PolicyEnforcer,
) -> Result<usize, PolicyStoreError> {
    let rules = store.load_rules().await?;
    let count = rules.len();
    let previous = enforcer.replace(rules)?;
    info!(rules = count, previous = previous.len(), "policy reloaded");
    Ok(count)
}

/// Reload every `period` until the returned handle is aborted.
pub fn spawn_periodic_reload(
    store: Arc<dyn PolicyStore>,
    enforcer: Arc<PolicyEnforcer>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match reload(store.as_ref(), &enforcer).await {
                Ok(_) => {}
                Err(PolicyStoreError::Snapshot(e)) => {
                    error!(error = %e, "policy snapshot unusable, stopping reload task");
                    return;
                }
                Err(e) => warn!(error = %e, "policy reload failed, keeping previous rules"),
            }
        }
    })
}

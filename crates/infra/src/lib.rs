//! Infrastructure layer: configuration, key material, identity and policy storage.

pub mod config;
pub mod identity;
pub mod policy_store;
pub mod public_key;

pub use config::{Config, ConfigError};
pub use identity::{
    IdentityStore, IdentitySynchronizer, InMemoryIdentityStore, PostgresIdentityStore, StoreError,
    SyncError, SyncFailurePolicy, SyncOutcome,
};
pub use policy_store::{
    PolicyStore, PolicyStoreError, PostgresPolicyStore, StaticPolicyStore, load_enforcer, reload,
    spawn_periodic_reload,
};
pub use public_key::{PublicKeyError, decode_public_key_pem, fetch_public_key};

//! `starter-auth`: pure authentication/authorization boundary.
//!
//! Token verification, identity claims, the local identity record model and
//! the policy evaluator. This crate is decoupled from HTTP servers and from
//! storage; callers inject the public key and the rule set.

pub mod bearer;
pub mod claims;
pub mod policy;
pub mod roles;
pub mod token;
pub mod user;

pub use bearer::{BEARER_SCHEME, parse_bearer};
pub use claims::{IdentityClaims, validate_claims};
pub use policy::{
    ActionPattern, EvalError, PolicyEnforcer, PolicyError, PolicyEvaluator, PolicyRule,
    ResourcePattern, RuleSet,
};
pub use roles::Role;
pub use token::{ACCEPTED_ALGORITHMS, RsaTokenVerifier, TokenVerifier, VerificationError, verify};
pub use user::IdentityRecord;

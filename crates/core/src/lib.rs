//! `starter-core`: shared identifiers and the domain error model.
//!
//! This crate has no infrastructure concerns and no knowledge of HTTP.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::UserId;

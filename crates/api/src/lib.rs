//! HTTP API: authorization pipeline, middleware adapters, routing.

pub mod app;
pub mod context;
pub mod middleware;
pub mod pipeline;

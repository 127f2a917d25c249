//! API Layer
//!
//! Exposes the profile job use cases twice: as REST routes (axum) and as
//! JSON-RPC 2.0 methods (jsonrpsee). Both share one [`ApiHandler`].

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod rest;
pub mod server;
pub mod types;

pub use handler::ApiHandler;
pub use rate_limiter::RateLimiter;
pub use rest::{create_router, RestServer, RestServerConfig};
pub use server::{RpcServer, RpcServerConfig};

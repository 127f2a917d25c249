//! JSON-RPC Server
//!
//! Binds to localhost only. Method names carry a version suffix so
//! payloads can evolve without breaking older clients.

use crate::error::to_rpc_error;
use crate::handler::ApiHandler;
use crate::types::{CancelParams, StatusParams, SubmitParams};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9527;

pub const METHOD_SUBMIT: &str = "profile.submit.v1";
pub const METHOD_STATUS: &str = "profile.status.v1";
pub const METHOD_CANCEL: &str = "profile.cancel.v1";

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<ApiHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: Arc<ApiHandler>) -> Self {
        Self { config, handler }
    }

    /// Start serving; the returned handle stops the server when asked
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = build_module(self.handler)?;

        info!(addr = %local_addr, "JSON-RPC server started");
        Ok((local_addr, server.start(module)))
    }
}

fn build_module(handler: Arc<ApiHandler>) -> Result<RpcModule<()>, String> {
    let mut module = RpcModule::new(());

    let h = handler.clone();
    module.register_async_method(METHOD_SUBMIT, move |params, _, _| {
        let handler = h.clone();
        async move {
            let req: SubmitParams = params.parse()?;
            handler
                .submit(&req.username, req.mods)
                .await
                .map_err(to_rpc_error)
        }
    })
    .map_err(|e| e.to_string())?;

    let h = handler.clone();
    module.register_async_method(METHOD_STATUS, move |params, _, _| {
        let handler = h.clone();
        async move {
            let req: StatusParams = params.parse()?;
            handler.status(&req.id).await.map_err(to_rpc_error)
        }
    })
    .map_err(|e| e.to_string())?;

    let h = handler;
    module.register_async_method(METHOD_CANCEL, move |params, _, _| {
        let handler = h.clone();
        async move {
            let req: CancelParams = params.parse()?;
            handler.cancel(&req.id).await.map_err(to_rpc_error)
        }
    })
    .map_err(|e| e.to_string())?;

    Ok(module)
}

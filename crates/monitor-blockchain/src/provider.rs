use std::{num::NonZeroUsize, sync::Arc};

use alloy::{
    network::Ethereum,
    providers::{DynProvider, Provider, ProviderBuilder, WsConnect},
    rpc::client::RpcClient,
    transports::{
        BoxTransport, IntoBoxTransport,
        http::{Http, reqwest::Url},
        layers::FallbackLayer,
    },
};
use tower::ServiceBuilder;

use crate::{ChainId, error::BlockchainError};

/// Use Arc<DynProvider> for thread-safe sharing.
pub(crate) type ChainProvider = Arc<DynProvider<Ethereum>>;

/// Creates a read-only provider over the given RPC endpoints.
/// Supports both HTTP and WebSocket endpoints with automatic failover.
pub(crate) async fn initialize_provider(
    chain_id: &ChainId,
    rpc_endpoints: &[String],
) -> Result<ChainProvider, BlockchainError> {
    let mut transports: Vec<BoxTransport> = Vec::new();
    let mut valid_endpoints = Vec::new();

    for endpoint in rpc_endpoints {
        if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
            let ws_connect = WsConnect::new(endpoint);
            match RpcClient::connect_pubsub(ws_connect).await {
                Ok(client) => {
                    transports.push(client.transport().clone().into_box_transport());
                    valid_endpoints.push(endpoint.clone());
                    tracing::debug!(chain_id = %chain_id, "WebSocket RPC endpoint added: {}", endpoint);
                }
                Err(e) => {
                    tracing::warn!(
                        chain_id = %chain_id,
                        "Failed to connect to WebSocket RPC '{}': {}",
                        endpoint,
                        e
                    );
                }
            }
        } else {
            match endpoint.parse::<Url>() {
                Ok(url) => {
                    transports.push(Http::new(url).into_box_transport());
                    valid_endpoints.push(endpoint.clone());
                    tracing::debug!(chain_id = %chain_id, "HTTP RPC endpoint added: {}", endpoint);
                }
                Err(e) => {
                    tracing::warn!(chain_id = %chain_id, "Invalid RPC URL '{}': {}", endpoint, e);
                }
            }
        }
    }

    if transports.is_empty() {
        return Err(BlockchainError::RpcConnectionFailed {
            attempts: rpc_endpoints.len(),
        });
    }

    // One active transport at a time: pure failover, ranked by latency and success rate.
    let fallback_layer = FallbackLayer::default().with_active_transport_count(NonZeroUsize::MIN);

    let transport = ServiceBuilder::new()
        .layer(fallback_layer)
        .service(transports);

    let client = RpcClient::builder().transport(transport, false);
    let provider = ProviderBuilder::new().connect_client(client);

    match provider.get_block_number().await {
        Ok(block) => {
            tracing::info!(
                chain_id = %chain_id,
                block,
                endpoints = ?valid_endpoints,
                "Chain provider initialized"
            );
            Ok(Arc::new(provider.erased()))
        }
        Err(e) => {
            tracing::warn!(
                chain_id = %chain_id,
                error = %e,
                "All RPC endpoints failed connectivity check"
            );
            Err(BlockchainError::RpcConnectionFailed {
                attempts: valid_endpoints.len(),
            })
        }
    }
}

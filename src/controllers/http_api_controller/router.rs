use axum::{Router, routing::get};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    HttpApiDeps,
    v1::{
        chains::ChainsHttpApiController, health::HealthHttpApiController,
        info::InfoHttpApiController,
    },
};
use crate::runtime::{ExecutionScope, TaskError, TaskExit};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct HttpApiConfig {
    /// Whether the HTTP API server is enabled.
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl HttpApiConfig {
    pub(crate) fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub(crate) struct HttpApiRouter {
    config: HttpApiConfig,
    router: Router,
}

impl HttpApiRouter {
    pub(crate) fn new(config: &HttpApiConfig, deps: HttpApiDeps) -> Self {
        let router = Router::new()
            .route("/v1/health", get(HealthHttpApiController::handle_request))
            .route("/v1/info", get(InfoHttpApiController::handle_request))
            .route("/v1/chains", get(ChainsHttpApiController::handle_request))
            .with_state(deps)
            // Request tracing, then CORS as the outermost layer.
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        HttpApiRouter {
            config: config.to_owned(),
            router,
        }
    }

    pub(crate) async fn bind(&self) -> Result<TcpListener, TaskError> {
        let address = self.config.address();
        let bound = TcpListener::bind(&address).await;
        bound.map_err(|source| TaskError::ServiceBind { address, source })
    }

    /// Binds and serves until the scope is cancelled. Bind and serve errors
    /// are returned to the supervisor.
    pub(crate) async fn listen_and_handle_http_requests(
        self,
        scope: ExecutionScope,
    ) -> Result<TaskExit, TaskError> {
        let listener = self.bind().await?;
        self.serve(listener, scope).await
    }

    pub(crate) async fn serve(
        self,
        listener: TcpListener,
        scope: ExecutionScope,
    ) -> Result<TaskExit, TaskError> {
        match listener.local_addr() {
            Ok(address) => tracing::info!(address = %address, "HTTP API listening"),
            Err(error) => tracing::warn!(error = %error, "HTTP API listening on unknown address"),
        }

        let shutdown = scope.clone();
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .map_err(TaskError::Service)?;

        if scope.is_cancelled() {
            Ok(TaskExit::Cancelled)
        } else {
            Ok(TaskExit::Completed)
        }
    }

    #[cfg(test)]
    pub(crate) fn into_router(self) -> Router {
        self.router
    }
}

/// Stand-in service task used when the HTTP API is disabled.
pub(crate) async fn wait_for_cancellation(scope: ExecutionScope) -> Result<TaskExit, TaskError> {
    scope.cancelled().await;
    Ok(TaskExit::Cancelled)
}

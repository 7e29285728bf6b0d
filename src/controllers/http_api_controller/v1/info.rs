use axum::{Json, extract::State};

use crate::controllers::http_api_controller::{
    deps::InfoHttpApiControllerDeps, v1::dto::info::InfoResponse,
};

pub(crate) struct InfoHttpApiController;
const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

impl InfoHttpApiController {
    pub(crate) async fn handle_request(
        State(deps): State<InfoHttpApiControllerDeps>,
    ) -> Json<InfoResponse> {
        Json(InfoResponse {
            name: APP_NAME,
            version: APP_VERSION,
            uptime_secs: deps.started_at.elapsed().as_secs(),
            state: deps.supervisor_state.borrow().as_str(),
            chains: deps.chain_count,
            dispatched_events: deps.sink.dispatched_count(),
            outputs: deps.sink.destination_names(),
        })
    }
}

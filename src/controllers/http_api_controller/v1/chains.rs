use axum::{Json, extract::State};

use crate::controllers::http_api_controller::{
    deps::ChainsHttpApiControllerDeps,
    v1::dto::chains::{ChainDto, ChainsResponse},
};

pub(crate) struct ChainsHttpApiController;

impl ChainsHttpApiController {
    pub(crate) async fn handle_request(
        State(deps): State<ChainsHttpApiControllerDeps>,
    ) -> Json<ChainsResponse> {
        Json(ChainsResponse {
            chains: deps.chains.iter().map(ChainDto::from).collect(),
        })
    }
}

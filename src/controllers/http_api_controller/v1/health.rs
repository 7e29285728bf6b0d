use axum::Json;

use crate::controllers::http_api_controller::v1::dto::health::HealthResponse;

pub(crate) struct HealthHttpApiController;

impl HealthHttpApiController {
    pub(crate) async fn handle_request() -> Json<HealthResponse> {
        Json(HealthResponse::ok())
    }
}

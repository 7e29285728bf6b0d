use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub(crate) fn ok() -> Self {
        Self { status: "ok" }
    }
}

use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub state: &'static str,
    pub chains: usize,
    pub dispatched_events: u64,
    pub outputs: Vec<String>,
}

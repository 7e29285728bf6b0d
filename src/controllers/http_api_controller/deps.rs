use std::{sync::Arc, time::Instant};

use axum::extract::FromRef;
use monitor_domain::Chain;

use tokio::sync::watch;

use crate::{runtime::SupervisorState, sink::EventSink};

#[derive(Clone)]
pub(crate) struct HttpApiDeps {
    pub(crate) sink: EventSink,
    pub(crate) chains: Arc<[Chain]>,
    pub(crate) started_at: Instant,
    pub(crate) supervisor_state: watch::Receiver<SupervisorState>,
}

#[derive(Clone)]
pub(crate) struct InfoHttpApiControllerDeps {
    pub(crate) sink: EventSink,
    pub(crate) chain_count: usize,
    pub(crate) started_at: Instant,
    pub(crate) supervisor_state: watch::Receiver<SupervisorState>,
}

impl FromRef<HttpApiDeps> for InfoHttpApiControllerDeps {
    fn from_ref(input: &HttpApiDeps) -> Self {
        Self {
            sink: input.sink.clone(),
            chain_count: input.chains.len(),
            started_at: input.started_at,
            supervisor_state: input.supervisor_state.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct ChainsHttpApiControllerDeps {
    pub(crate) chains: Arc<[Chain]>,
}

impl FromRef<HttpApiDeps> for ChainsHttpApiControllerDeps {
    fn from_ref(input: &HttpApiDeps) -> Self {
        Self {
            chains: Arc::clone(&input.chains),
        }
    }
}

pub(crate) mod deps;
pub(crate) mod router;
mod v1;

pub(crate) use deps::HttpApiDeps;
pub(crate) use router::{HttpApiConfig, HttpApiRouter, wait_for_cancellation};

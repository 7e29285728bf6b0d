use thiserror::Error;

/// Terminal failure of a supervised task.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("service endpoint could not bind {address}: {source}")]
    ServiceBind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("service endpoint failed: {0}")]
    Service(#[source] std::io::Error),

    #[error("task '{task}' panicked: {message}")]
    Panicked { task: String, message: String },
}

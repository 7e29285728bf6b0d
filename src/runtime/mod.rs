mod error;
mod scope;
mod shutdown;
mod supervisor;

use std::time::Instant;

pub use error::TaskError;
pub(crate) use scope::ExecutionScope;
pub(crate) use shutdown::ShutdownTrigger;
pub(crate) use supervisor::{
    ChainFailurePolicy, SupervisionReport, Supervisor, SupervisorConfig, SupervisorState,
    TaskDescriptor, TaskExit,
};

use crate::{
    bootstrap::Application,
    controllers::http_api_controller::{HttpApiDeps, HttpApiRouter, wait_for_cancellation},
    error::MonitorError,
    sink::EventSink,
    tasks::run_chain_task,
};

/// Starts one task per chain plus the service task, waits for all of them,
/// then releases the outputs.
pub(crate) async fn run(app: Application, scope: ExecutionScope) -> Result<(), MonitorError> {
    let Application {
        config,
        chains,
        sink,
    } = app;

    let supervisor = Supervisor::new(scope.clone(), config.supervisor.chain_failure_policy);

    let mut tasks: Vec<TaskDescriptor> = chains
        .iter()
        .map(|chain| {
            let watch = run_chain_task(chain.clone(), sink.clone(), scope.clone());
            TaskDescriptor::chain(format!("chain:{}", chain.id()), async move {
                Ok::<_, TaskError>(watch.await)
            })
        })
        .collect();

    let service = if config.http_api.enabled {
        let deps = HttpApiDeps {
            sink: sink.clone(),
            chains,
            started_at: Instant::now(),
            supervisor_state: supervisor.subscribe(),
        };
        let router = HttpApiRouter::new(&config.http_api, deps);
        TaskDescriptor::service(
            "http_api",
            router.listen_and_handle_http_requests(scope.clone()),
        )
    } else {
        tracing::info!("HTTP API disabled");
        TaskDescriptor::service("http_api", wait_for_cancellation(scope.clone()))
    };
    tasks.push(service);

    let report = supervise(supervisor, tasks, &sink).await;

    report.into_result().map_err(MonitorError::from)
}

/// Runs `tasks` to completion and releases the sink's destinations only
/// after every task has returned, so no event reaches a closing output.
pub(crate) async fn supervise(
    mut supervisor: Supervisor,
    tasks: Vec<TaskDescriptor>,
    sink: &EventSink,
) -> SupervisionReport {
    for task in tasks {
        supervisor.spawn(task);
    }

    let report = supervisor.wait().await;
    sink.release().await;
    report
}

use std::{any::Any, future::Future, panic::AssertUnwindSafe, pin::Pin, time::Instant};

use futures::FutureExt;
use monitor_observability::record_task_exit;
use serde::{Deserialize, Serialize};
use tokio::{sync::watch, task::JoinSet};

use super::{ExecutionScope, TaskError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ChainFailurePolicy {
    /// A panicking chain task is logged and the others keep running.
    Isolate,
    /// A panicking chain task cancels the whole scope like a service failure.
    Propagate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SupervisorConfig {
    pub chain_failure_policy: ChainFailurePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskKind {
    /// Fire-and-forget: its failure is contained unless the policy says otherwise.
    Chain,
    /// Propagating: its failure becomes the group outcome.
    Service,
}

impl TaskKind {
    fn as_str(self) -> &'static str {
        match self {
            TaskKind::Chain => "chain",
            TaskKind::Service => "service",
        }
    }
}

/// How a task ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskExit {
    /// The work loop finished on its own.
    Completed,
    /// The task observed scope cancellation and unwound.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskState {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl TaskState {
    fn as_str(self) -> &'static str {
        match self {
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Cancelled => "cancelled",
            TaskState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SupervisorState {
    Idle,
    Running,
    Draining,
    Stopped,
}

impl SupervisorState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Running => "running",
            SupervisorState::Draining => "draining",
            SupervisorState::Stopped => "stopped",
        }
    }
}

pub(crate) type TaskFuture = Pin<Box<dyn Future<Output = Result<TaskExit, TaskError>> + Send>>;

pub(crate) struct TaskDescriptor {
    name: String,
    kind: TaskKind,
    run: TaskFuture,
}

impl TaskDescriptor {
    pub(crate) fn new<F>(name: impl Into<String>, kind: TaskKind, run: F) -> Self
    where
        F: Future<Output = Result<TaskExit, TaskError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            kind,
            run: Box::pin(run),
        }
    }

    pub(crate) fn chain<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Future<Output = Result<TaskExit, TaskError>> + Send + 'static,
    {
        Self::new(name, TaskKind::Chain, run)
    }

    pub(crate) fn service<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Future<Output = Result<TaskExit, TaskError>> + Send + 'static,
    {
        Self::new(name, TaskKind::Service, run)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TaskReport {
    pub name: String,
    pub kind: TaskKind,
    pub state: TaskState,
}

/// Aggregate outcome returned once every task has exited.
#[derive(Debug)]
pub(crate) struct SupervisionReport {
    pub tasks: Vec<TaskReport>,
    pub error: Option<TaskError>,
}

impl SupervisionReport {
    #[cfg(test)]
    pub(crate) fn state_of(&self, name: &str) -> Option<TaskState> {
        self.tasks
            .iter()
            .find(|task| task.name == name)
            .map(|task| task.state)
    }

    #[cfg(test)]
    pub(crate) fn states_of(&self, kind: TaskKind) -> Vec<TaskState> {
        self.tasks
            .iter()
            .filter(|task| task.kind == kind)
            .map(|task| task.state)
            .collect()
    }

    pub(crate) fn into_result(self) -> Result<(), TaskError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

type Joined = (usize, Result<Result<TaskExit, TaskError>, Box<dyn Any + Send>>);

struct TaskRecord {
    name: String,
    kind: TaskKind,
    state: TaskState,
    started: Instant,
}

/// Runs heterogeneous tasks under one shared scope.
///
/// A single loop collects every exit and branches on the task kind only to
/// decide whether a failure cancels the scope. Tasks are never aborted: after
/// cancellation each one must notice and return on its own.
pub(crate) struct Supervisor {
    scope: ExecutionScope,
    policy: ChainFailurePolicy,
    tasks: JoinSet<Joined>,
    records: Vec<TaskRecord>,
    state: watch::Sender<SupervisorState>,
}

impl Supervisor {
    pub(crate) fn new(scope: ExecutionScope, policy: ChainFailurePolicy) -> Self {
        let (state, _) = watch::channel(SupervisorState::Idle);
        Self {
            scope,
            policy,
            tasks: JoinSet::new(),
            records: Vec::new(),
            state,
        }
    }

    pub(crate) fn state(&self) -> SupervisorState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SupervisorState> {
        self.state.subscribe()
    }

    pub(crate) fn spawn(&mut self, descriptor: TaskDescriptor) {
        let TaskDescriptor { name, kind, run } = descriptor;
        let index = self.records.len();

        tracing::debug!(task = %name, kind = kind.as_str(), "Starting task");
        self.records.push(TaskRecord {
            name,
            kind,
            state: TaskState::Running,
            started: Instant::now(),
        });
        self.tasks
            .spawn(async move { (index, AssertUnwindSafe(run).catch_unwind().await) });

        self.state.send_if_modified(|state| {
            if *state == SupervisorState::Idle {
                *state = SupervisorState::Running;
                true
            } else {
                false
            }
        });
    }

    /// Waits until every task has returned and reports the first propagated
    /// failure.
    pub(crate) async fn wait(mut self) -> SupervisionReport {
        let scope = self.scope.clone();
        loop {
            let watching_cancellation = self.state() == SupervisorState::Running;
            tokio::select! {
                joined = self.tasks.join_next() => match joined {
                    Some(Ok((index, outcome))) => {
                        self.handle_exit(index, outcome);
                        if self.tasks.is_empty() {
                            self.enter_draining();
                        }
                    }
                    Some(Err(error)) => {
                        tracing::error!(error = %error, "Supervised task was aborted");
                    }
                    None => break,
                },
                _ = scope.cancelled(), if watching_cancellation => {
                    self.enter_draining();
                }
            }
        }

        self.state.send_replace(SupervisorState::Stopped);
        tracing::info!(tasks = self.records.len(), "All tasks stopped");

        SupervisionReport {
            tasks: self
                .records
                .into_iter()
                .map(|record| TaskReport {
                    name: record.name,
                    kind: record.kind,
                    state: record.state,
                })
                .collect(),
            error: self.scope.take_error(),
        }
    }

    fn enter_draining(&self) {
        self.state.send_if_modified(|state| {
            if *state == SupervisorState::Running {
                tracing::info!("Supervisor draining");
                *state = SupervisorState::Draining;
                true
            } else {
                false
            }
        });
    }

    fn propagates(&self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::Service => true,
            TaskKind::Chain => self.policy == ChainFailurePolicy::Propagate,
        }
    }

    fn handle_exit(
        &mut self,
        index: usize,
        outcome: Result<Result<TaskExit, TaskError>, Box<dyn Any + Send>>,
    ) {
        let Some(record) = self.records.get(index) else {
            return;
        };
        let (name, kind, lifetime) = (record.name.clone(), record.kind, record.started.elapsed());

        let result = outcome.unwrap_or_else(|payload| {
            Err(TaskError::Panicked {
                task: name.clone(),
                message: panic_message(payload.as_ref()),
            })
        });

        let state = match result {
            Ok(TaskExit::Completed) => {
                tracing::info!(task = %name, kind = kind.as_str(), "Task completed");
                TaskState::Completed
            }
            Ok(TaskExit::Cancelled) => {
                tracing::info!(task = %name, kind = kind.as_str(), "Task cancelled");
                TaskState::Cancelled
            }
            Err(error) if self.propagates(kind) => {
                tracing::error!(
                    task = %name,
                    kind = kind.as_str(),
                    error = %error,
                    "Task failed, cancelling all tasks"
                );
                if !self.scope.fail(error) {
                    tracing::debug!(task = %name, "A failure was already recorded");
                }
                TaskState::Failed
            }
            Err(error) => {
                tracing::error!(
                    task = %name,
                    kind = kind.as_str(),
                    error = %error,
                    "Task failed, other tasks keep running"
                );
                TaskState::Failed
            }
        };

        record_task_exit(&name, kind.as_str(), state.as_str(), lifetime);
        if let Some(record) = self.records.get_mut(index) {
            record.state = state;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

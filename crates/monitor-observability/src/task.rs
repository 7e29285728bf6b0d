use std::time::Duration;

use metrics::{counter, histogram};

pub fn record_task_exit(task: &str, kind: &str, outcome: &str, lifetime: Duration) {
    counter!(
        "monitor_task_exits_total",
        "task" => task.to_string(),
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!(
        "monitor_task_lifetime_seconds",
        "task" => task.to_string(),
        "kind" => kind.to_string()
    )
    .record(lifetime.as_secs_f64());
}

pub(crate) mod chain_watcher;
#[cfg(test)]
pub(crate) mod testing;

pub(crate) use chain_watcher::run_chain_task;

pub(crate) mod monitored_contract;

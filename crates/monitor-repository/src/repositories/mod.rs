pub(crate) mod event_repository;
pub(crate) mod monitored_contract_repository;

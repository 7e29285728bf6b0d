pub(crate) mod chains;
pub(crate) mod health;
pub(crate) mod info;

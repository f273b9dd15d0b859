pub(crate) mod config_summary;
pub(crate) mod health;
pub(crate) mod token_info;

pub(crate) mod analyze;
pub(crate) mod config;
pub(crate) mod list;

pub(crate) mod auth;
pub(crate) mod dashboard;
pub(crate) mod flow;
pub(crate) mod regions;
pub(crate) mod reports;
pub(crate) mod status;

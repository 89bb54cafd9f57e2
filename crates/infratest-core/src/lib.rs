pub mod config;
pub mod logging;

pub mod catalogs;
pub mod http_probe;
pub mod must;
pub mod retry;
pub mod shell;

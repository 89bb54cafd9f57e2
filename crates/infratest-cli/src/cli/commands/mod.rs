//! CLI command handlers, one per file.

mod catalogs;
mod classify;
mod run;
mod wait_http;

pub use catalogs::run_catalogs;
pub use classify::run_classify;
pub use run::run_command;
pub use wait_http::run_wait_http;

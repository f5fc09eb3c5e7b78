//! CLI command implementations.

pub mod init;
pub mod list;
pub mod run;

pub use init::init_project;
pub use list::list_suppliers;
pub use run::{run_config, RunOptions};

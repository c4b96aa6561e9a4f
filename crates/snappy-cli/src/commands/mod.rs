//! Command implementations.

pub mod config;
pub mod list;
pub mod plan;
pub mod run;
pub mod watch;

pub use self::config::execute_config;
pub use self::list::execute_list;
pub use self::plan::execute_plan;
pub use self::run::execute_run;
pub use self::watch::execute_watch;

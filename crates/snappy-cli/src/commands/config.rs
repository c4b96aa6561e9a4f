//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::error::Result;
use crate::output::Formatter;
use snappy_config::ConfigFile;

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, config: &ConfigFile, formatter: &Formatter) -> Result<String> {
    let policy = config.policy_for(&args.dataset)?;
    formatter.format_policy(&args.dataset, &policy)
}

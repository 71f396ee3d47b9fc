//! Default destination command.

use crate::output::OutputFormatter;
use anyhow::Result;
use fwinflate_core::config::default_destination;

pub fn execute(formatter: &dyn OutputFormatter) -> Result<()> {
    formatter.format_default_dir(&default_destination())
}

//! Drop command

mod handler;

use clap::Args;

pub use handler::handle_drop_command;

#[derive(Args)]
pub struct DropCommands {
    /// Table to drop as <schema>.<table>
    pub table: String,
}

//! Schemas command

mod handler;

pub use handler::handle_schemas_command;

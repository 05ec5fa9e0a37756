// Low-level runner communication: stdout commands and file commands.

pub mod file;
pub mod stdout;

pub use file::{format_pairs, format_values, known_kind, resolve_path, FileCommand, FileCommandKind};
pub use stdout::{
    disable_echo, disable_process_commands, enable_echo, enable_process_commands, escape_data,
    escape_property, StdOutCommand,
};

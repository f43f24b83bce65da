pub mod commands;
mod args;
mod session;

pub use args::{Cli, Commands, ConfigSubcommands, MemorySubcommands};
pub use session::{
    Session, apply_overrides, build_coordinator, build_safety, build_session, memory_dir,
    memory_file, open_store,
};

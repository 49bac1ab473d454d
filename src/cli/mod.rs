mod args;
mod commands;
mod session;

pub use args::{Cli, Commands, ConfigSubcommands};
pub use commands::run;
pub use session::{AdminSession, Settings, load_read_only};

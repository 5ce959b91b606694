//! Shell command execution and process-level signal handling.

pub mod command;
pub mod interrupt;
pub mod platform;

pub use command::{execute, execute_checked, CommandOptions, CommandResult};
pub use interrupt::{handle_interrupt, install_interrupt_handler, InterruptAction};
pub use platform::{detect_shell, is_ci, shell_flag};

// file: src/process/mod.rs
// description: Subprocess capability module exports
// reference: Internal module structure

pub mod runner;
pub mod system;

pub use runner::{CommandOutput, CommandRunner};
pub use system::SystemCommandRunner;

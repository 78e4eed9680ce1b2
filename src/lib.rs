// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod process;
pub mod sync;
pub mod utils;

pub use config::{Config, GitConfig, ProjectConfig, RepositoryDescriptor, WorkspaceConfig};
pub use error::{Result, SyncError};
pub use process::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use sync::{ProgressTracker, SyncOutcome, SyncStats, Synchronizer};
pub use utils::Validator;

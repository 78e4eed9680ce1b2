// file: src/sync/mod.rs
// description: Repository synchronization module exports
// reference: Internal module structure

pub mod outcome;
pub mod progress;
pub mod synchronizer;

pub use outcome::SyncOutcome;
pub use progress::{ProgressTracker, SyncStats};
pub use synchronizer::Synchronizer;

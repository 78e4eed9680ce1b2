// file: src/utils/mod.rs
// description: Utilities module exports
// reference: Internal module structure

pub mod logging;
pub mod validation;

pub use validation::Validator;

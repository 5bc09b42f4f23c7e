//! Application use cases.

mod execute_case;

pub use execute_case::{ExecuteCase, ExecuteCaseError, ExecuteOutcome};

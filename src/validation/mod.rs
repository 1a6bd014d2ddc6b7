/// Validation domain layer: input parsing, processing mode, outcomes, errors.
pub mod batch;
pub mod errors;
pub mod outcome;

pub use batch::{ProcessingMode, parse_addresses};
pub use errors::CommandError;
pub use outcome::Outcome;

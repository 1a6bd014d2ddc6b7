/// Remote validation service: client contract and HTTP implementation.
pub mod client;
pub mod errors;

pub use client::{
    BatchOptions, HttpValidationClient, ResponseFormat, ValidationClient, VerifyOptions,
};
pub use errors::ClientError;

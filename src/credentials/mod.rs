/// Local credential storage and API key resolution.
pub mod resolve;
pub mod store;

pub use resolve::{mask_api_key, resolve_api_key};
pub use store::{ConfigStore, ConfigUpdate, Configuration, StoreError};

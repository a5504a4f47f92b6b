//! Data module - CSV loading and preprocessing

mod dates;
mod loader;
mod processor;

pub use dates::parse_timestamp;
pub use loader::{DataLoader, LoadError};
pub use processor::{preprocess, Preprocessor, SchemaError};

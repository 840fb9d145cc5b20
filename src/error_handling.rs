pub mod types;

pub use types::{ArgsError, ProcessError, StorageError};

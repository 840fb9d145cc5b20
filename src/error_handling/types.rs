use std::fmt;

/// Configuration faults raised before any work starts.
#[derive(Debug)]
pub enum ArgsError {
    ArgumentMissing { missing: Vec<String>, action: String },
    BadEnvPair(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::ArgumentMissing { missing, action } => {
                write!(f, "Parameter{:?} is required for action<{}>.", missing, action)
            }
            ArgsError::BadEnvPair(pair) => {
                write!(f, "Environment pair {:?} is not KEY=VALUE formatted", pair)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug)]
pub enum StorageError {
    /// Payload shape does not match the path's declared format. Raised before
    /// any network call and never retried.
    TypeMismatch { path: String, data: &'static str },
    Transfer(object_store::Error),
    Serde(serde_json::Error),
    Io(std::io::Error),
    Utf8(std::string::FromUtf8Error),
}

impl StorageError {
    /// NotFound is a no-op for deletion and `false` for existence checks.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Transfer(object_store::Error::NotFound { .. }))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::TypeMismatch { path, data } => {
                write!(f, "Data type {} doesn't match file type {}", data, path)
            }
            StorageError::Transfer(e) => write!(f, "Storage transfer error: {}", e),
            StorageError::Serde(e) => write!(f, "Storage serialization error: {}", e),
            StorageError::Io(e) => write!(f, "Storage IO error: {}", e),
            StorageError::Utf8(e) => write!(f, "Storage content is not valid UTF-8: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        StorageError::Transfer(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err)
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<std::string::FromUtf8Error> for StorageError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        StorageError::Utf8(err)
    }
}

/// Faults surfaced by the process layer (and the CLI boundary).
#[derive(Debug)]
pub enum ProcessError {
    UnknownOrder(String),
    UnknownItem(String),
    /// `--order_data` carried no order and no storage fallback.
    MissingOrder(String),
    Args(ArgsError),
    Storage(StorageError),
    Serde(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::UnknownOrder(id) => write!(f, "Unknown order: {}", id),
            ProcessError::UnknownItem(item) => write!(f, "Item not on the menu: {}", item),
            ProcessError::MissingOrder(id) => {
                write!(f, "Order data for {} has no order and no storage fallback", id)
            }
            ProcessError::Args(e) => write!(f, "Argument error: {}", e),
            ProcessError::Storage(e) => write!(f, "Storage error: {}", e),
            ProcessError::Serde(e) => write!(f, "Serialization error: {}", e),
            ProcessError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ProcessError {}

impl From<ArgsError> for ProcessError {
    fn from(err: ArgsError) -> Self {
        ProcessError::Args(err)
    }
}

impl From<StorageError> for ProcessError {
    fn from(err: StorageError) -> Self {
        ProcessError::Storage(err)
    }
}

impl From<serde_json::Error> for ProcessError {
    fn from(err: serde_json::Error) -> Self {
        ProcessError::Serde(err)
    }
}

impl From<std::io::Error> for ProcessError {
    fn from(err: std::io::Error) -> Self {
        ProcessError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_missing_message_matches_convention() {
        let err = ArgsError::ArgumentMissing {
            missing: vec!["order_id".to_string()],
            action: "get_order".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parameter[\"order_id\"] is required for action<get_order>."
        );
    }

    #[test]
    fn type_mismatch_message_names_path_and_type() {
        let err = StorageError::TypeMismatch {
            path: "a/b.txt".to_string(),
            data: "json",
        };
        assert_eq!(err.to_string(), "Data type json doesn't match file type a/b.txt");
    }

    #[test]
    fn not_found_classification() {
        let err = StorageError::Transfer(object_store::Error::NotFound {
            path: "a/b.json".to_string(),
            source: "gone".into(),
        });
        assert!(err.is_not_found());

        let other = StorageError::TypeMismatch {
            path: "a".into(),
            data: "text",
        };
        assert!(!other.is_not_found());
    }
}

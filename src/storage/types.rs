use serde_json::Value;

/// Content for a blob write. JSON payloads belong on `.json` paths, text on
/// everything else; the mismatch check happens before any network call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Json(_) => "json",
            Payload::Text(_) => "text",
        }
    }
}

/// Per-call knobs for container access.
#[derive(Debug, Clone)]
pub struct AccessOptions {
    /// Falls back to `AZURE_STORAGE_CONTAINER_NAME` when unset.
    pub container_name: Option<String>,
    /// Idempotent container creation; "already exists" is not a fault.
    pub create_container: bool,
    /// Reuse the process-wide cached client. When false a dedicated client
    /// is built for the call and released afterwards.
    pub cache_client: bool,
}

impl Default for AccessOptions {
    fn default() -> Self {
        AccessOptions {
            container_name: None,
            create_container: false,
            cache_client: true,
        }
    }
}

impl AccessOptions {
    pub fn container(name: &str) -> Self {
        AccessOptions {
            container_name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

use serde::{Deserialize, Serialize};

/// Body of `GET /` on the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexResponse {
    pub message: String,
    #[serde(default)]
    pub docs: Option<String>,
}

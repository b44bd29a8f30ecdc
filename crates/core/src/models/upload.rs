use serde::{Deserialize, Serialize};

/// Summary returned by every `POST /{collection}/bulk-upload` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkUploadReport {
    pub status: String,
    pub created: u32,
    /// Existing rows overwritten by the upload. Only the rooms endpoint
    /// reports it.
    #[serde(default)]
    pub updated: u32,
    pub skipped: u32,
    /// Per-row problems, e.g. `"Row 4: Access denied - not your department"`.
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl BulkUploadReport {
    pub fn error_count(&self) -> usize {
        self.errors.as_ref().map_or(0, Vec::len)
    }
}

//! Uploaded files referenced by File and Image answers

use serde::{Deserialize, Serialize};

/// A file uploaded as answer value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFile {
    pub id: i64,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Content as `data:` URL, usually `data:<mime>;base64,<payload>`
    pub file: String,
}

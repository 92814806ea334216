use bytes::Bytes;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidationError};

use super::materials::{validate_description, validate_title, Difficulty, Material, MaterialType};

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// PDF, Word, PowerPoint, Excel, common images and plain text. Anything
/// else is refused before a single byte is transmitted.
pub static ALLOWED_CONTENT_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "application/pdf",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "application/vnd.ms-powerpoint",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "application/vnd.ms-excel",
        "image/jpeg",
        "image/png",
        "image/gif",
        "text/plain",
    ])
});

/// The single file attachment of a new material.
#[derive(Debug, Clone, Serialize)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A fully validated upload form. `validate()` must pass before the
/// payload is handed to the transport layer; a payload that fails here
/// performs no network I/O at all.
#[derive(Validate, Debug, Clone)]
pub struct NewMaterialPayload {
    #[validate(custom = "validate_title")]
    pub title: String,
    #[validate(custom = "validate_description")]
    pub description: String,
    #[validate(length(min = 2, message = "Disciplina é obrigatória"))]
    pub discipline: String,
    #[validate(length(min = 1, message = "Série é obrigatória"))]
    pub grade: String,
    pub material_type: MaterialType,
    pub difficulty: Difficulty,
    pub sub_topic: Option<String>,
    pub estimated_duration: Option<i32>,
    pub tags: Vec<String>,
    #[validate(custom = "validate_file")]
    pub file: UploadFile,
}

fn validate_file(file: &UploadFile) -> Result<(), ValidationError> {
    if file.size() > MAX_FILE_SIZE {
        let mut error = ValidationError::new("file_size");
        error.message = Some("Arquivo deve ter no máximo 10MB".into());
        return Err(error);
    }
    if !ALLOWED_CONTENT_TYPES.contains(file.content_type.as_str()) {
        let mut error = ValidationError::new("file_type");
        error.message =
            Some("Tipo de arquivo não permitido. Use PDF, DOC, PPT, XLS, imagens ou TXT".into());
        return Err(error);
    }
    Ok(())
}

/// Reply of a successful upload: the freshly created material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaterialReceipt {
    pub material: Material,
}

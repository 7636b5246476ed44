//! Upload validation
//!
//! Policies describe what an endpoint accepts (size ceiling, extension
//! whitelist); candidates are checked against a policy before any byte is
//! stored. A [`FileAsset`] can only be obtained through
//! [`FileAsset::validated`], so holding one proves the checks passed.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::row::{CellValue, TableRow};

/// Size ceiling for documents: 5 MiB.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
/// Size ceiling for images: 3 MiB.
pub const MAX_IMAGE_SIZE: u64 = 3 * 1024 * 1024;
/// Default cap on files per batch.
pub const MAX_BATCH_FILES: usize = 10;

/// Document extensions accepted by default.
pub const ALLOWED_DOCUMENT_TYPES: [&str; 9] =
    ["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv"];
/// Image extensions accepted by default.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// What kind of upload an endpoint takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Document,
    Image,
}

impl FileKind {
    /// Noun used in rejection messages.
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Document => "File",
            FileKind::Image => "Image",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Document => "document",
            FileKind::Image => "image",
        }
    }
}

/// Rules one endpoint applies to incoming files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Largest accepted size in bytes. A file of exactly this size passes;
    /// rejection is strictly-greater-than.
    pub max_size: u64,
    /// Lowercase extensions (no dot). Matching is case-insensitive.
    pub allowed_extensions: Vec<String>,
    /// Drives rejection messages and the kind stamped on minted assets.
    pub kind: FileKind,
}

impl UploadPolicy {
    pub fn new(
        max_size: u64,
        allowed_extensions: impl IntoIterator<Item = impl Into<String>>,
        kind: FileKind,
    ) -> Self {
        Self {
            max_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|ext| ext.into().to_lowercase())
                .collect(),
            kind,
        }
    }

    pub fn document() -> Self {
        Self::new(MAX_FILE_SIZE, ALLOWED_DOCUMENT_TYPES, FileKind::Document)
    }

    pub fn image() -> Self {
        Self::new(MAX_IMAGE_SIZE, ALLOWED_IMAGE_TYPES, FileKind::Image)
    }

    /// Check one candidate. Order: presence, size, extension.
    pub fn validate(&self, candidate: Option<&UploadCandidate>) -> Result<(), UploadError> {
        let Some(candidate) = candidate else {
            return Err(UploadError::Missing);
        };
        if candidate.size > self.max_size {
            return Err(UploadError::TooLarge {
                limit_mb: self.max_size / (1024 * 1024),
            });
        }
        let extension = file_extension(&candidate.name).unwrap_or_default();
        if !self.allowed_extensions.iter().any(|e| *e == extension) {
            return Err(UploadError::DisallowedType {
                kind: self.kind.label().to_string(),
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }
        Ok(())
    }
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No file selected")]
    Missing,
    #[error("File size exceeds {limit_mb}MB limit")]
    TooLarge { limit_mb: u64 },
    #[error("{kind} type '.{extension}' is not allowed. Allowed types: {allowed}")]
    DisallowedType {
        kind: String,
        extension: String,
        allowed: String,
    },
    #[error("Maximum {max} files allowed")]
    TooManyFiles { max: usize },
}

/// An incoming file before validation: just its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCandidate {
    pub name: String,
    pub size: u64,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// A validated upload. Only constructible via [`FileAsset::validated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAsset {
    pub id: String,
    /// Name the file was uploaded under.
    pub name: String,
    /// Collision-free name for storage, from [`unique_file_name`].
    pub stored_name: String,
    pub extension: String,
    pub kind: FileKind,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    /// SHA-256 of the content, when the caller hashed it.
    pub checksum: Option<String>,
}

impl FileAsset {
    /// Validate `candidate` against `policy` and mint the asset.
    pub fn validated(
        policy: &UploadPolicy,
        candidate: &UploadCandidate,
    ) -> Result<Self, UploadError> {
        policy.validate(Some(candidate))?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: candidate.name.clone(),
            stored_name: unique_file_name(&candidate.name),
            extension: file_extension(&candidate.name).unwrap_or_default(),
            kind: policy.kind,
            size: candidate.size,
            uploaded_at: Utc::now(),
            checksum: None,
        })
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }
}

impl TableRow for FileAsset {
    fn cell(&self, key: &str) -> CellValue {
        match key {
            "id" => CellValue::Text(self.id.clone()),
            "name" => CellValue::Text(self.name.clone()),
            "stored_name" => CellValue::Text(self.stored_name.clone()),
            "extension" => CellValue::Text(self.extension.clone()),
            "kind" => CellValue::Text(self.kind.as_str().to_string()),
            "size" => CellValue::Int(self.size as i64),
            // RFC 3339 text orders chronologically
            "uploaded_at" => CellValue::Text(self.uploaded_at.to_rfc3339()),
            "checksum" => match &self.checksum {
                Some(checksum) => CellValue::Text(checksum.clone()),
                None => CellValue::Null,
            },
            _ => CellValue::Null,
        }
    }
}

/// One rejected file in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedFile {
    pub name: String,
    pub reason: String,
}

/// Result of a batch validation: every file gets an individual verdict.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub accepted: Vec<FileAsset>,
    pub rejected: Vec<RejectedFile>,
}

impl BatchOutcome {
    pub fn all_accepted(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Validate a whole selection against one policy.
///
/// Files are judged independently: one rejection never rolls back or blocks
/// the others. When the selection exceeds `max_files`, the first `max_files`
/// candidates are still validated normally and only the overflow is
/// rejected, each with a cap error.
pub fn validate_batch(
    policy: &UploadPolicy,
    candidates: &[UploadCandidate],
    max_files: usize,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for (index, candidate) in candidates.iter().enumerate() {
        if index >= max_files {
            outcome.rejected.push(RejectedFile {
                name: candidate.name.clone(),
                reason: UploadError::TooManyFiles { max: max_files }.to_string(),
            });
            continue;
        }
        match FileAsset::validated(policy, candidate) {
            Ok(asset) => outcome.accepted.push(asset),
            Err(error) => outcome.rejected.push(RejectedFile {
                name: candidate.name.clone(),
                reason: error.to_string(),
            }),
        }
    }
    outcome
}

/// Lowercased extension after the final dot, `None` when there is no dot.
pub fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, extension)| extension.to_lowercase())
}

/// Size in megabytes, two decimals, for display.
pub fn size_in_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

const SUFFIX_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Collision-free storage name: `{stem}_{millis}_{random6}.{ext}`.
pub fn unique_file_name(original: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    match original.rsplit_once('.') {
        Some((stem, extension)) => format!("{stem}_{timestamp}_{suffix}.{extension}"),
        None => format!("{original}_{timestamp}_{suffix}"),
    }
}

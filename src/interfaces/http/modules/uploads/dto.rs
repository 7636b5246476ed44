//! Upload DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::core::upload::FileAsset;

/// Stored asset, as the API reports it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileAssetDto {
    pub id: String,
    /// Name the file was uploaded under.
    pub name: String,
    /// Collision-free name the content is stored under.
    pub stored_name: String,
    pub extension: String,
    /// `document` or `image`, from the policy that admitted the file.
    pub kind: String,
    pub size: u64,
    pub uploaded_at: String,
    /// SHA-256 of the uploaded bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl From<FileAsset> for FileAssetDto {
    fn from(asset: FileAsset) -> Self {
        Self {
            id: asset.id,
            name: asset.name,
            stored_name: asset.stored_name,
            extension: asset.extension,
            kind: asset.kind.as_str().to_string(),
            size: asset.size,
            uploaded_at: asset.uploaded_at.to_rfc3339(),
            checksum: asset.checksum,
        }
    }
}

/// One rejected part with its user-displayable reason.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RejectedFileDto {
    pub name: String,
    pub reason: String,
}

/// Per-file verdicts for one multipart request.
///
/// A rejection never rolls back the parts that passed; the envelope's
/// `success` flag is `false` as soon as any part was rejected.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadOutcome {
    pub accepted: Vec<FileAssetDto>,
    pub rejected: Vec<RejectedFileDto>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadParams {
    /// Validation policy: `document` (default) or `image`.
    pub kind: Option<String>,
}

/// Swagger model of the multipart payload.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// Raw file content; repeat the part to upload a batch.
    #[schema(value_type = String, format = Binary)]
    pub files: Vec<u8>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListAssetsParams {
    pub offset: Option<u64>,
    pub limit: Option<u32>,
    /// `name`, `size` or `uploaded_at`.
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// `asc` or `desc`, defaults to `asc`.
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
    /// Case-insensitive substring match on the original file name.
    pub q: Option<String>,
}

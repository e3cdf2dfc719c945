use callsheet_core::error::CoreError;
use callsheet_core::types::FamilyId;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to load details for family {family_id}: {reason}")]
    LoadFailed { family_id: FamilyId, reason: String },

    #[error("Submit failed: {0}")]
    SubmitFailed(String),

    #[error("Create failed: {0}")]
    CreateFailed(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

//! Collaborator traits for the catalog and persistence boundaries.
//!
//! The selection subsystem never talks to the backing store directly:
//! detail loads, link persistence, and inline entity creation all go
//! through these seams, implemented by the hosting application.

use async_trait::async_trait;

use callsheet_core::catalog::{Colourway, FamilyDetails, ProductFamily};
use callsheet_core::link::ProductLink;
use callsheet_core::types::FamilyId;

use crate::error::CatalogError;

/// Lazily loads one family's colourways and size run.
///
/// Implementations must resolve or reject; a rejection surfaces as a
/// "no details available" affordance, never an unhandled error.
#[async_trait]
pub trait FamilyDetailsLoader: Send + Sync {
    async fn load_family_details(&self, family_id: &FamilyId)
        -> Result<FamilyDetails, CatalogError>;
}

/// Receives finalized links for persistence.
///
/// One element for the single-item flow, the whole cart for the batch
/// flow. The call is atomic from this subsystem's perspective: it either
/// persists everything or fails as a unit, and is never retried here.
#[async_trait]
pub trait SelectionSink: Send + Sync {
    async fn submit(&self, links: Vec<ProductLink>) -> Result<(), CatalogError>;
}

/// Payload for creating a family inline from the selector.
#[derive(Debug, Clone, Default)]
pub struct NewFamily {
    pub style_name: String,
    pub style_number: Option<String>,
    pub gender: Option<String>,
    pub product_type: Option<String>,
    pub sizes: Vec<String>,
}

/// Payload for creating a colourway inline from the selector.
#[derive(Debug, Clone, Default)]
pub struct NewColourway {
    pub colour_name: String,
    pub sku_code: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub image_path: Option<String>,
}

/// Optional escape hatch for creating catalog entities inline. On
/// success the new entity is spliced into the local list/cache so it is
/// selectable without a reload.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn create_family(&self, payload: NewFamily) -> Result<ProductFamily, CatalogError>;

    async fn create_colourway(
        &self,
        family_id: &FamilyId,
        payload: NewColourway,
    ) -> Result<Colourway, CatalogError>;
}

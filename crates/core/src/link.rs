//! The persisted shot-product link.
//!
//! A [`ProductLink`] is the association between a shot and one
//! family+colourway+size(scope). The shot document is the sole owner of
//! its link array; links are never shared across shots. Construction and
//! the inline-mutation helpers uphold the size/scope/status invariants,
//! so a link built through this module is valid by construction.

use serde::{Deserialize, Serialize};

use crate::catalog::{Colourway, FamilyDetails, ProductFamily, COLOUR_STATUS_ARCHIVED};
use crate::error::CoreError;
use crate::scope::{SelectionStatus, SizeChoice, SizeScope};
use crate::types::{ColourId, FamilyId, LinkId, Timestamp};

/// One persisted shot-product association.
///
/// Invariants:
/// - `size.is_some()` iff `size_scope == SizeScope::Single`
/// - `status == SelectionStatus::PendingSize` iff `size_scope == SizeScope::Pending`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLink {
    pub id: LinkId,
    pub family_id: FamilyId,
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_number: Option<String>,
    pub colour_id: ColourId,
    pub colour_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour_image_path: Option<String>,
    pub size: Option<String>,
    pub size_scope: SizeScope,
    pub status: SelectionStatus,
    pub created_at: Timestamp,
}

impl ProductLink {
    /// Create a link from a completed family+colourway selection.
    ///
    /// The colourway must not be archived at creation time (staleness
    /// after the fact is tolerated — see [`resolve_colour`]). Membership
    /// of the colourway in the family is the caller's lookup; this
    /// constructor only enforces the archival rule.
    pub fn new(
        family: &ProductFamily,
        colour: &Colourway,
        choice: SizeChoice,
    ) -> Result<Self, CoreError> {
        if colour.status == COLOUR_STATUS_ARCHIVED {
            return Err(CoreError::Validation(format!(
                "Colourway '{}' is archived and cannot be linked",
                colour.id
            )));
        }
        let status = choice.status();
        let (size, size_scope) = choice.into_parts();
        Ok(Self {
            id: uuid::Uuid::now_v7().to_string(),
            family_id: family.id.clone(),
            family_name: family.style_name.clone(),
            style_number: family.style_number.clone(),
            colour_id: colour.id.clone(),
            colour_name: colour.colour_name.clone(),
            colour_image_path: colour.image_path.clone(),
            size,
            size_scope,
            status,
            created_at: chrono::Utc::now(),
        })
    }

    /// Re-check the size/scope/status invariants.
    ///
    /// Links built through this module hold these by construction; this
    /// is for links deserialized from stored documents.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.size.is_some() != (self.size_scope == SizeScope::Single) {
            return Err(CoreError::Validation(format!(
                "Link '{}': a size is bound iff the scope is 'single' (scope is '{}')",
                self.id, self.size_scope
            )));
        }
        if self.status != SelectionStatus::for_scope(self.size_scope) {
            return Err(CoreError::Validation(format!(
                "Link '{}': status '{}' does not match scope '{}'",
                self.id, self.status, self.size_scope
            )));
        }
        Ok(())
    }

    /// Whether the link still needs a size decision.
    pub fn is_pending_size(&self) -> bool {
        self.status == SelectionStatus::PendingSize
    }

    /// The dedup identity of this link: `(family, colour, size, scope)`.
    pub fn selection_key(&self) -> SelectionKey {
        SelectionKey {
            family_id: self.family_id.clone(),
            colour_id: self.colour_id.clone(),
            size: self.size.clone(),
            scope: self.size_scope,
        }
    }

    /// Rebind the link to a different colourway of the same family,
    /// returning a complete replacement link (immutable update).
    ///
    /// If a single size is bound and the new colourway does not offer it,
    /// the size falls back to pending; otherwise the size is preserved.
    /// `family_sizes` is the family size run the colourway falls back to.
    pub fn with_colour(&self, colour: &Colourway, family_sizes: &[String]) -> Self {
        let keep_size = match (&self.size, self.size_scope) {
            (Some(size), SizeScope::Single) => colour.offers_size(family_sizes, size),
            _ => true,
        };
        let mut next = self.clone();
        next.colour_id = colour.id.clone();
        next.colour_name = colour.colour_name.clone();
        next.colour_image_path = colour.image_path.clone();
        if !keep_size {
            next.size = None;
            next.size_scope = SizeScope::Pending;
            next.status = SelectionStatus::PendingSize;
        }
        next
    }

    /// Rebind the size from a raw picker value, returning a complete
    /// replacement link. Same three-branch resolution as the add flow.
    pub fn with_size(&self, value: &str) -> Self {
        let choice = SizeChoice::from_picker_value(value);
        let status = choice.status();
        let (size, size_scope) = choice.into_parts();
        Self {
            size,
            size_scope,
            status,
            ..self.clone()
        }
    }
}

/// Semantic identity of a link for cart-level deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub family_id: FamilyId,
    pub colour_id: ColourId,
    pub size: Option<String>,
    pub scope: SizeScope,
}

// ---------------------------------------------------------------------------
// Stale colour resolution
// ---------------------------------------------------------------------------

/// Outcome of resolving a link's colourway against the family's current
/// details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColourResolution<'a> {
    /// The colourway still exists in the catalog.
    Resolved(&'a Colourway),
    /// The colour id no longer resolves (e.g. archived away after
    /// linking). Tolerated staleness: consumers render "details pending",
    /// never an error.
    Unresolved,
}

/// Resolve a link's colour reference against loaded family details.
pub fn resolve_colour<'a>(link: &ProductLink, details: &'a FamilyDetails) -> ColourResolution<'a> {
    match details.colourway(&link.colour_id) {
        Some(colour) => ColourResolution::Resolved(colour),
        None => ColourResolution::Unresolved,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Single-item selection state machine for the add/edit flow.
//!
//! Models the composition of one shot-product link: browse the family
//! list, pick a family (details load asynchronously), pick a colourway,
//! optionally pick a size, submit. The machine is pure — the async detail
//! load is driven by the caller, which feeds results back through
//! [`SelectionState::details_loaded`] / [`SelectionState::details_failed`].
//!
//! The submit guard ([`SelectionState::can_submit`]) is the single source
//! of truth for whether submission is allowed: family and colour chosen,
//! details not loading. It deliberately never depends on the size field —
//! a pending-size link is a legitimate terminal state. The guard is
//! re-checked inside [`SelectionState::submit`], which fails closed with
//! a `Conflict` rather than panicking.

use crate::catalog::{ColourAvailability, Colourway, FamilyDetails, ProductFamily};
use crate::error::CoreError;
use crate::link::ProductLink;
use crate::scope::{DefaultScope, SizeChoice, ALL_SIZES};
use crate::types::ColourId;

// ---------------------------------------------------------------------------
// Stages and modes
// ---------------------------------------------------------------------------

/// Which screen of the add flow the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStage {
    /// Browsing the family list.
    Browsing,
    /// A family is chosen; composing colourway + size.
    Composing,
}

/// How a submit interprets the staged size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Use the staged size verbatim ("Add" action).
    Complete,
    /// Force the link to pending regardless of any staged size
    /// ("Add without size" action).
    PendingSize,
}

/// Tunables for the selection flow.
#[derive(Debug, Clone, Copy)]
pub struct SelectionConfig {
    /// Scope applied when [`SubmitMode::Complete`] fires with no size
    /// staged. The single-item flow historically leaves the link pending.
    pub default_scope_when_unset: DefaultScope,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_scope_when_unset: DefaultScope::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionState
// ---------------------------------------------------------------------------

/// In-memory state of one link being composed.
#[derive(Debug, Clone)]
pub struct SelectionState {
    config: SelectionConfig,
    stage: SelectionStage,
    family: Option<ProductFamily>,
    details: Option<FamilyDetails>,
    loading_details: bool,
    load_error: Option<String>,
    colour_id: Option<ColourId>,
    /// Raw picker value; empty string means no size staged.
    staged_size: String,
}

impl SelectionState {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            stage: SelectionStage::Browsing,
            family: None,
            details: None,
            loading_details: false,
            load_error: None,
            colour_id: None,
            staged_size: String::new(),
        }
    }

    // -- accessors -----------------------------------------------------------

    pub fn stage(&self) -> SelectionStage {
        self.stage
    }

    pub fn family(&self) -> Option<&ProductFamily> {
        self.family.as_ref()
    }

    pub fn details(&self) -> Option<&FamilyDetails> {
        self.details.as_ref()
    }

    pub fn colour_id(&self) -> Option<&str> {
        self.colour_id.as_deref()
    }

    pub fn staged_size(&self) -> &str {
        &self.staged_size
    }

    /// Whether the family's details are still loading. Colour and size
    /// pickers are disabled while this is true.
    pub fn is_loading_details(&self) -> bool {
        self.loading_details
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The sizes the current colourway offers, for the size picker.
    /// Empty until a colourway is chosen.
    pub fn offered_sizes(&self) -> &[String] {
        match (&self.details, self.current_colourway()) {
            (Some(details), Some(colour)) => colour.sizes_on_offer(&details.sizes),
            _ => &[],
        }
    }

    fn current_colourway(&self) -> Option<&Colourway> {
        let id = self.colour_id.as_deref()?;
        self.details.as_ref()?.colourway(id)
    }

    // -- transitions -----------------------------------------------------------

    /// Choose a family from the list: enter `Composing`, discard any
    /// previous colour/size, and mark details loading. The caller kicks
    /// off the actual load and reports back via [`Self::details_loaded`]
    /// or [`Self::details_failed`].
    pub fn select_family(&mut self, family: ProductFamily) {
        self.stage = SelectionStage::Composing;
        self.family = Some(family);
        self.details = None;
        self.loading_details = true;
        self.load_error = None;
        self.colour_id = None;
        self.staged_size.clear();
    }

    /// Apply the loaded details for the current family.
    pub fn details_loaded(&mut self, details: FamilyDetails) {
        self.details = Some(details);
        self.loading_details = false;
        self.load_error = None;
    }

    /// Record a detail-load failure. The flow stays in `Composing` with
    /// an empty picker and the reason surfaced to the UI.
    pub fn details_failed(&mut self, reason: impl Into<String>) {
        self.details = None;
        self.loading_details = false;
        self.load_error = Some(reason.into());
    }

    /// Choose a colourway of the current family.
    ///
    /// If a concrete size is staged and the new colourway does not offer
    /// it, the staged size resets to unset (the link would otherwise bind
    /// a size the colourway cannot supply).
    pub fn select_colour(&mut self, colour_id: &str) -> Result<(), CoreError> {
        let details = self.composing_details()?;
        let colour = details
            .colourway(colour_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "colourway",
                id: colour_id.to_string(),
            })?;
        if colour.availability() == ColourAvailability::Hidden {
            return Err(CoreError::Validation(format!(
                "Colourway '{colour_id}' is archived and cannot be selected"
            )));
        }

        let staged_still_offered = self.staged_size.is_empty()
            || self.staged_size == ALL_SIZES
            || colour.offers_size(&details.sizes, &self.staged_size);

        self.colour_id = Some(colour_id.to_string());
        if !staged_still_offered {
            self.staged_size.clear();
        }
        Ok(())
    }

    /// Stage a size picker value: empty for "no size", [`ALL_SIZES`] for
    /// every offered size, or a concrete size the colourway offers.
    pub fn select_size(&mut self, value: &str) -> Result<(), CoreError> {
        let details = self.composing_details()?;
        let colour = self
            .colour_id
            .as_deref()
            .and_then(|id| details.colourway(id))
            .ok_or_else(|| {
                CoreError::Conflict("Choose a colourway before a size".to_string())
            })?;

        if !value.is_empty() && value != ALL_SIZES && !colour.offers_size(&details.sizes, value)
        {
            return Err(CoreError::Validation(format!(
                "Size '{value}' is not offered by colourway '{}'",
                colour.id
            )));
        }
        self.staged_size = value.to_string();
        Ok(())
    }

    /// Return to the family list, discarding in-progress state.
    pub fn back(&mut self) {
        *self = Self::new(self.config);
    }

    /// Whether submission is currently allowed: family and colourway
    /// chosen, details not loading. Never depends on the size field.
    pub fn can_submit(&self) -> bool {
        self.family.is_some() && self.colour_id.is_some() && !self.loading_details
    }

    /// Build the link a submit would emit, without consuming the state.
    ///
    /// Re-checks [`Self::can_submit`] and fails closed with `Conflict`
    /// when the guard does not hold.
    pub fn preview(&self, mode: SubmitMode) -> Result<ProductLink, CoreError> {
        if !self.can_submit() {
            return Err(CoreError::Conflict(
                "Selection is incomplete or details are still loading".to_string(),
            ));
        }
        // can_submit() guarantees family and colour are set, and a colour
        // can only be set once details are present.
        let family = self.family.as_ref().ok_or_else(Self::guard_conflict)?;
        let colour = self.current_colourway().ok_or_else(Self::guard_conflict)?;

        let choice = match mode {
            SubmitMode::PendingSize => SizeChoice::pending(),
            SubmitMode::Complete if self.staged_size.is_empty() => {
                self.config.default_scope_when_unset.choice()
            }
            SubmitMode::Complete => SizeChoice::from_picker_value(&self.staged_size),
        };
        ProductLink::new(family, colour, choice)
    }

    /// Emit the link and reset to `Browsing`.
    pub fn submit(&mut self, mode: SubmitMode) -> Result<ProductLink, CoreError> {
        let link = self.preview(mode)?;
        self.back();
        Ok(link)
    }

    /// Reset to `Browsing` after the caller has persisted a previewed
    /// link. Same transition as a submit, without rebuilding the link.
    pub fn confirm_submitted(&mut self) {
        self.back();
    }

    /// Splice an inline-created colourway into the loaded details so it
    /// is selectable without a reload.
    pub fn add_colourway(&mut self, colourway: Colourway) -> Result<(), CoreError> {
        match &mut self.details {
            Some(details) => {
                details.upsert_colourway(colourway);
                Ok(())
            }
            None => Err(CoreError::Conflict(
                "Family details are not loaded".to_string(),
            )),
        }
    }

    fn composing_details(&self) -> Result<&FamilyDetails, CoreError> {
        if self.stage != SelectionStage::Composing {
            return Err(CoreError::Conflict(
                "No family is being composed".to_string(),
            ));
        }
        if self.loading_details {
            return Err(CoreError::Conflict(
                "Family details are still loading".to_string(),
            ));
        }
        self.details
            .as_ref()
            .ok_or_else(|| CoreError::Conflict("Family details are not available".to_string()))
    }

    fn guard_conflict() -> CoreError {
        CoreError::Conflict("Selection is incomplete or details are still loading".to_string())
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

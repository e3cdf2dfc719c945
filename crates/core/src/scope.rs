//! Size scope and selection status semantics.
//!
//! A shot-product link binds either exactly one size, every size the
//! colourway offers, or no size yet ("pending"). Pickers hand this module
//! a raw string value; the three-branch resolution here is the single
//! source of truth for how that value maps onto a scope.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Sentinel picker value meaning "every size the colourway offers".
///
/// Pickers emit this instead of a concrete size string; it never appears
/// in a persisted link.
pub const ALL_SIZES: &str = "__ALL_SIZES__";

// ---------------------------------------------------------------------------
// SizeScope
// ---------------------------------------------------------------------------

/// How a link's size value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeScope {
    /// Exactly one size string is bound.
    Single,
    /// All sizes of the chosen colourway apply; no size string is bound.
    All,
    /// No size decided yet; downstream consumers must treat the link as
    /// incomplete.
    Pending,
}

impl SizeScope {
    /// Parse a scope string from a stored document.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "single" => Ok(Self::Single),
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            _ => Err(CoreError::Validation(format!(
                "Invalid size scope '{s}'. Must be one of: single, all, pending"
            ))),
        }
    }

    /// Convert to a document-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::All => "all",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for SizeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SelectionStatus
// ---------------------------------------------------------------------------

/// Completeness of a link. Derived from the scope: `PendingSize` iff the
/// scope is [`SizeScope::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionStatus {
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "pending-size")]
    PendingSize,
}

impl SelectionStatus {
    /// The status implied by a scope.
    pub fn for_scope(scope: SizeScope) -> Self {
        match scope {
            SizeScope::Pending => Self::PendingSize,
            SizeScope::Single | SizeScope::All => Self::Complete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::PendingSize => "pending-size",
        }
    }
}

impl std::fmt::Display for SelectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SizeChoice
// ---------------------------------------------------------------------------

/// A resolved size decision: the bound size (if any) and its scope.
///
/// Invariant: `size.is_some()` iff `scope == SizeScope::Single`. The
/// constructors are the only way to build one, so the invariant holds by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeChoice {
    size: Option<String>,
    scope: SizeScope,
}

impl SizeChoice {
    /// No size decided yet.
    pub fn pending() -> Self {
        Self {
            size: None,
            scope: SizeScope::Pending,
        }
    }

    /// Every size the colourway offers.
    pub fn all() -> Self {
        Self {
            size: None,
            scope: SizeScope::All,
        }
    }

    /// Exactly one size.
    pub fn single(size: impl Into<String>) -> Self {
        Self {
            size: Some(size.into()),
            scope: SizeScope::Single,
        }
    }

    /// Resolve a raw picker value. Empty string means "no size decided",
    /// [`ALL_SIZES`] means "all sizes", anything else is a concrete size.
    pub fn from_picker_value(value: &str) -> Self {
        if value.is_empty() {
            Self::pending()
        } else if value == ALL_SIZES {
            Self::all()
        } else {
            Self::single(value)
        }
    }

    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn scope(&self) -> SizeScope {
        self.scope
    }

    /// The completeness status this choice implies.
    pub fn status(&self) -> SelectionStatus {
        SelectionStatus::for_scope(self.scope)
    }

    pub fn into_parts(self) -> (Option<String>, SizeScope) {
        (self.size, self.scope)
    }
}

// ---------------------------------------------------------------------------
// DefaultScope
// ---------------------------------------------------------------------------

/// Policy for the scope applied when a selection is submitted with no
/// size chosen.
///
/// The two add flows historically disagreed: the single-item flow left
/// the link pending, while the cart flow bound all sizes. The policy is
/// an explicit knob so callers choose deliberately instead of inheriting
/// whichever flow they happen to route through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultScope {
    /// No size chosen means the link stays incomplete.
    Pending,
    /// No size chosen means every offered size applies.
    All,
}

impl DefaultScope {
    /// The choice this policy resolves an unset size to.
    pub fn choice(self) -> SizeChoice {
        match self {
            Self::Pending => SizeChoice::pending(),
            Self::All => SizeChoice::all(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

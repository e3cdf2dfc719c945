//! Product catalog read model: families, colourways, and size availability.
//!
//! These types mirror the shape of the hosted catalog documents. The
//! catalog is read-only from this crate's point of view — families and
//! colourways are owned by the catalog service and loaded lazily per
//! family (see the `callsheet-catalog` crate for the async cache).

use serde::{Deserialize, Serialize};

use crate::types::{ColourId, FamilyId};

// ---------------------------------------------------------------------------
// Colourway status constants
// ---------------------------------------------------------------------------

/// The colourway is live and freely selectable.
pub const COLOUR_STATUS_ACTIVE: &str = "active";

/// The colourway has been retired and is hidden from selection entirely.
pub const COLOUR_STATUS_ARCHIVED: &str = "archived";

// ---------------------------------------------------------------------------
// Catalog entities
// ---------------------------------------------------------------------------

/// A product style grouping multiple colourways (e.g. one t-shirt style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFamily {
    pub id: FamilyId,
    pub style_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default)]
    pub archived: bool,
    /// The family-level size run. Colourways without their own size
    /// override fall back to this list.
    #[serde(default)]
    pub sizes: Vec<String>,
}

/// A specific colour variant of a family, with its own size availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Colourway {
    pub id: ColourId,
    #[serde(rename = "colorName")]
    pub colour_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_code: Option<String>,
    /// Free-form status string from the catalog. Only
    /// [`COLOUR_STATUS_ACTIVE`] and [`COLOUR_STATUS_ARCHIVED`] carry
    /// meaning here; anything else is selectable but flagged.
    pub status: String,
    /// Per-colourway size override. `None` (or empty) means the family
    /// size run applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// How a colourway may be offered in a picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourAvailability {
    /// Active colourway, offered normally.
    Selectable,
    /// Non-active but not archived (e.g. "discontinued"); offered with a
    /// warning affordance.
    SelectableWithWarning,
    /// Archived; filtered out of pickers entirely.
    Hidden,
}

impl Colourway {
    /// Classify this colourway for selection purposes.
    pub fn availability(&self) -> ColourAvailability {
        if self.status == COLOUR_STATUS_ARCHIVED {
            ColourAvailability::Hidden
        } else if self.status == COLOUR_STATUS_ACTIVE {
            ColourAvailability::Selectable
        } else {
            ColourAvailability::SelectableWithWarning
        }
    }

    /// The sizes this colourway actually offers, falling back to the
    /// family size run when the colourway carries no override.
    ///
    /// An empty override list is treated the same as no override — the
    /// catalog service emits both shapes for "no per-colour sizing".
    pub fn sizes_on_offer<'a>(&'a self, family_sizes: &'a [String]) -> &'a [String] {
        match &self.sizes {
            Some(own) if !own.is_empty() => own,
            _ => family_sizes,
        }
    }

    /// Whether `size` is offered by this colourway (with family fallback).
    pub fn offers_size(&self, family_sizes: &[String], size: &str) -> bool {
        self.sizes_on_offer(family_sizes).iter().any(|s| s == size)
    }
}

// ---------------------------------------------------------------------------
// Lazily-loaded family details
// ---------------------------------------------------------------------------

/// The lazily-loaded detail payload for one family: its colourways and
/// its family-level size run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyDetails {
    #[serde(default)]
    pub colourways: Vec<Colourway>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl FamilyDetails {
    /// Look up a colourway by id, archived or not.
    pub fn colourway(&self, colour_id: &str) -> Option<&Colourway> {
        self.colourways.iter().find(|c| c.id == colour_id)
    }

    /// The colourways a picker should offer, in catalog order, with
    /// archived entries filtered out.
    pub fn selectable_colourways(&self) -> Vec<&Colourway> {
        self.colourways
            .iter()
            .filter(|c| c.availability() != ColourAvailability::Hidden)
            .collect()
    }

    /// Replace or append a colourway (used to splice in an inline-created
    /// colourway without a catalog reload).
    pub fn upsert_colourway(&mut self, colourway: Colourway) {
        match self.colourways.iter_mut().find(|c| c.id == colourway.id) {
            Some(existing) => *existing = colourway,
            None => self.colourways.push(colourway),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn colourway(id: &str, status: &str, sizes: Option<Vec<&str>>) -> Colourway {
        Colourway {
            id: id.to_string(),
            colour_name: format!("Colour {id}"),
            sku_code: None,
            status: status.to_string(),
            sizes: sizes.map(|s| s.into_iter().map(String::from).collect()),
            image_path: None,
        }
    }

    fn family_sizes() -> Vec<String> {
        vec!["S".into(), "M".into(), "L".into()]
    }

    // -- availability ---------------------------------------------------------

    #[test]
    fn active_colourway_is_selectable() {
        let c = colourway("c1", COLOUR_STATUS_ACTIVE, None);
        assert_eq!(c.availability(), ColourAvailability::Selectable);
    }

    #[test]
    fn archived_colourway_is_hidden() {
        let c = colourway("c1", COLOUR_STATUS_ARCHIVED, None);
        assert_eq!(c.availability(), ColourAvailability::Hidden);
    }

    #[test]
    fn other_status_is_selectable_with_warning() {
        let c = colourway("c1", "discontinued", None);
        assert_eq!(c.availability(), ColourAvailability::SelectableWithWarning);
    }

    // -- sizes_on_offer -------------------------------------------------------

    #[test]
    fn override_sizes_win_over_family_run() {
        let sizes = family_sizes();
        let c = colourway("c1", COLOUR_STATUS_ACTIVE, Some(vec!["S", "M"]));
        assert_eq!(c.sizes_on_offer(&sizes), ["S", "M"]);
    }

    #[test]
    fn no_override_falls_back_to_family_run() {
        let sizes = family_sizes();
        let c = colourway("c2", COLOUR_STATUS_ACTIVE, None);
        assert_eq!(c.sizes_on_offer(&sizes), ["S", "M", "L"]);
    }

    #[test]
    fn empty_override_falls_back_to_family_run() {
        let sizes = family_sizes();
        let c = colourway("c2", COLOUR_STATUS_ACTIVE, Some(vec![]));
        assert_eq!(c.sizes_on_offer(&sizes), ["S", "M", "L"]);
    }

    #[test]
    fn offers_size_respects_override() {
        let sizes = family_sizes();
        let c1 = colourway("c1", COLOUR_STATUS_ACTIVE, Some(vec!["S", "M"]));
        let c2 = colourway("c2", COLOUR_STATUS_ACTIVE, None);
        assert!(!c1.offers_size(&sizes, "L"));
        assert!(c2.offers_size(&sizes, "L"));
    }

    // -- FamilyDetails --------------------------------------------------------

    #[test]
    fn selectable_colourways_filters_archived_only() {
        let details = FamilyDetails {
            colourways: vec![
                colourway("c1", COLOUR_STATUS_ACTIVE, None),
                colourway("c2", COLOUR_STATUS_ARCHIVED, None),
                colourway("c3", "discontinued", None),
            ],
            sizes: family_sizes(),
        };
        let selectable = details.selectable_colourways();
        let ids: Vec<&str> = selectable.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c3"]);
    }

    #[test]
    fn colourway_lookup_includes_archived() {
        let details = FamilyDetails {
            colourways: vec![colourway("c2", COLOUR_STATUS_ARCHIVED, None)],
            sizes: vec![],
        };
        assert!(details.colourway("c2").is_some());
        assert!(details.colourway("missing").is_none());
    }

    #[test]
    fn upsert_replaces_existing_colourway() {
        let mut details = FamilyDetails {
            colourways: vec![colourway("c1", COLOUR_STATUS_ACTIVE, None)],
            sizes: vec![],
        };
        let mut updated = colourway("c1", COLOUR_STATUS_ACTIVE, None);
        updated.colour_name = "Renamed".to_string();
        details.upsert_colourway(updated);
        assert_eq!(details.colourways.len(), 1);
        assert_eq!(details.colourways[0].colour_name, "Renamed");
    }

    #[test]
    fn upsert_appends_new_colourway() {
        let mut details = FamilyDetails::default();
        details.upsert_colourway(colourway("c9", COLOUR_STATUS_ACTIVE, None));
        assert_eq!(details.colourways.len(), 1);
    }

    // -- serde shape ----------------------------------------------------------

    #[test]
    fn colourway_deserializes_stored_document_shape() {
        let c: Colourway = serde_json::from_str(
            r#"{"id":"c1","colorName":"Indigo","status":"active","skuCode":"SKU-1"}"#,
        )
        .unwrap();
        assert_eq!(c.colour_name, "Indigo");
        assert_eq!(c.sku_code.as_deref(), Some("SKU-1"));
        assert!(c.sizes.is_none());
    }

    #[test]
    fn family_deserializes_stored_document_shape() {
        let f: ProductFamily = serde_json::from_str(
            r#"{"id":"f1","styleName":"Crew Tee","styleNumber":"CT-100","sizes":["S","M"]}"#,
        )
        .unwrap();
        assert_eq!(f.style_name, "Crew Tee");
        assert!(!f.archived);
        assert_eq!(f.sizes, ["S", "M"]);
    }
}

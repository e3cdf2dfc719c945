//! Shared id and timestamp aliases.

/// Product family ids are opaque strings assigned by the backing store.
pub type FamilyId = String;

/// Colourway ids are opaque strings, unique within their family.
pub type ColourId = String;

/// Shot-product link ids are opaque unique strings generated at creation.
pub type LinkId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

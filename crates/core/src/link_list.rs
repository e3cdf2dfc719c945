//! The shot's persisted list of product links.
//!
//! A thin ordered collection with positional update/remove and pending
//! bookkeeping. Positional operations on an invalid index are an explicit
//! [`CoreError::IndexOutOfRange`], never a silent no-op. Semantic
//! deduplication happens upstream (cart or selector), so `add` is a plain
//! append.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::link::ProductLink;
use crate::types::FamilyId;

/// The ordered `ProductLink` array owned by one shot document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductLinkList {
    links: Vec<ProductLink>,
}

impl ProductLinkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_links(links: Vec<ProductLink>) -> Self {
        Self { links }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProductLink> {
        self.links.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductLink> {
        self.links.iter()
    }

    pub fn links(&self) -> &[ProductLink] {
        &self.links
    }

    /// Append a link to the list.
    pub fn add(&mut self, link: ProductLink) {
        self.links.push(link);
    }

    /// Replace the link at `index`, returning the previous value.
    pub fn update(&mut self, index: usize, link: ProductLink) -> Result<ProductLink, CoreError> {
        let len = self.links.len();
        let slot = self
            .links
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, link))
    }

    /// Remove and return the link at `index`.
    pub fn remove(&mut self, index: usize) -> Result<ProductLink, CoreError> {
        if index >= self.links.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: self.links.len(),
            });
        }
        Ok(self.links.remove(index))
    }

    /// Position of a link by id.
    pub fn position_of(&self, link_id: &str) -> Option<usize> {
        self.links.iter().position(|l| l.id == link_id)
    }

    /// How many links still need a size decision.
    pub fn pending_count(&self) -> usize {
        self.links.iter().filter(|l| l.is_pending_size()).count()
    }

    /// Whether every link has a resolved size scope.
    pub fn is_fully_specified(&self) -> bool {
        self.pending_count() == 0
    }

    /// Distinct family ids referenced by the list, in first-seen order.
    /// Drives batch detail resolution (one load per family, per-row
    /// loading indicators).
    pub fn family_ids(&self) -> Vec<FamilyId> {
        let mut seen = Vec::new();
        for link in &self.links {
            if !seen.contains(&link.family_id) {
                seen.push(link.family_id.clone());
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a ProductLinkList {
    type Item = &'a ProductLink;
    type IntoIter = std::slice::Iter<'a, ProductLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Multi-item cart for the batch selector flow.
//!
//! Users accumulate several links across family rows before one batch
//! submit. Each family row keeps its own transient colour/size picks
//! ([`RowSelection`]), reset after every add. The cart deduplicates on
//! the semantic key `(family, colour, size, scope)` — adding an identical
//! tuple twice is a silent no-op, not an error.
//!
//! The external submit is atomic from this subsystem's perspective: the
//! caller snapshots [`Cart::links`], hands them to the sink once, and
//! calls [`Cart::clear`] only on success. On failure the cart is
//! preserved untouched for another attempt.

use std::collections::HashSet;

use crate::catalog::{Colourway, ProductFamily};
use crate::error::CoreError;
use crate::link::{ProductLink, SelectionKey};
use crate::scope::{DefaultScope, SizeChoice};

// ---------------------------------------------------------------------------
// Per-row transient state
// ---------------------------------------------------------------------------

/// Transient colour/size picks for one family row of the batch selector.
///
/// The colour is tracked by position in the row's selectable colourway
/// list (the picker is positional), the size as a raw picker value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSelection {
    colour_index: Option<usize>,
    size: String,
}

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colour_index(&self) -> Option<usize> {
        self.colour_index
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn select_colour(&mut self, index: usize) {
        self.colour_index = Some(index);
    }

    pub fn select_size(&mut self, value: &str) {
        self.size = value.to_string();
    }

    /// Clear the row after its selection has been added to the cart.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

/// Outcome of a cart add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    Added,
    /// An identical `(family, colour, size, scope)` tuple was already in
    /// the cart; the add was silently dropped.
    Duplicate,
}

/// A transient batch of pending links accumulated before a single submit.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    entries: Vec<ProductLink>,
    keys: HashSet<SelectionKey>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn links(&self) -> &[ProductLink] {
        &self.entries
    }

    /// Build a link from a row's picks and add it, deduplicating on the
    /// semantic key.
    ///
    /// An empty `raw_size` resolves through `default_scope` — the batch
    /// flow historically binds all sizes when none is chosen, unlike the
    /// single-item flow (see [`DefaultScope`]).
    pub fn add(
        &mut self,
        family: &ProductFamily,
        colour: &Colourway,
        raw_size: &str,
        default_scope: DefaultScope,
    ) -> Result<CartOutcome, CoreError> {
        let choice = if raw_size.is_empty() {
            default_scope.choice()
        } else {
            SizeChoice::from_picker_value(raw_size)
        };
        let link = ProductLink::new(family, colour, choice)?;
        Ok(self.add_link(link))
    }

    /// Add an already-built link, deduplicating on the semantic key.
    pub fn add_link(&mut self, link: ProductLink) -> CartOutcome {
        let key = link.selection_key();
        if self.keys.contains(&key) {
            return CartOutcome::Duplicate;
        }
        self.keys.insert(key);
        self.entries.push(link);
        CartOutcome::Added
    }

    /// Remove one cart row by position.
    pub fn remove(&mut self, index: usize) -> Result<ProductLink, CoreError> {
        if index >= self.entries.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let link = self.entries.remove(index);
        self.keys.remove(&link.selection_key());
        Ok(link)
    }

    /// Drop every entry. Called by the flow driver after the external
    /// submit resolves successfully; never on failure.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

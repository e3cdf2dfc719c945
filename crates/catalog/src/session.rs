//! Flow drivers: wire the pure selection state machines to the async
//! collaborators.
//!
//! [`SelectionSession`] drives the single-item add flow; [`CartSession`]
//! drives the batch selector. Both treat the external submit as a single
//! atomic effect — nothing here retries, and the cart survives a failed
//! submit untouched.

use std::collections::HashMap;
use std::sync::Arc;

use callsheet_core::cart::{Cart, CartOutcome, RowSelection};
use callsheet_core::catalog::{Colourway, ProductFamily};
use callsheet_core::error::CoreError;
use callsheet_core::link::ProductLink;
use callsheet_core::scope::DefaultScope;
use callsheet_core::selection::{SelectionConfig, SelectionState, SubmitMode};
use callsheet_core::types::FamilyId;

use crate::cache::FamilyDetailsCache;
use crate::error::CatalogError;
use crate::loader::{CatalogWriter, NewColourway, NewFamily, SelectionSink};

// ---------------------------------------------------------------------------
// Single-item flow
// ---------------------------------------------------------------------------

/// Drives the single-item add/edit flow: family list, detail load,
/// colour/size composition, one-link submit.
pub struct SelectionSession {
    state: SelectionState,
    families: Vec<ProductFamily>,
    cache: Arc<FamilyDetailsCache>,
    sink: Arc<dyn SelectionSink>,
    writer: Option<Arc<dyn CatalogWriter>>,
}

impl SelectionSession {
    pub fn new(
        families: Vec<ProductFamily>,
        cache: Arc<FamilyDetailsCache>,
        sink: Arc<dyn SelectionSink>,
        config: SelectionConfig,
    ) -> Self {
        Self {
            state: SelectionState::new(config),
            families,
            cache,
            sink,
            writer: None,
        }
    }

    /// Enable the inline-create escape hatches.
    pub fn with_writer(mut self, writer: Arc<dyn CatalogWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// The browsable family list (archived families are not offered).
    pub fn families(&self) -> impl Iterator<Item = &ProductFamily> {
        self.families.iter().filter(|f| !f.archived)
    }

    /// Pick a family and load its details, feeding the outcome back into
    /// the state machine. A load failure is recovered locally: the state
    /// records the reason and the flow stays usable.
    pub async fn choose_family(&mut self, family_id: &FamilyId) -> Result<(), CatalogError> {
        let family = self
            .families
            .iter()
            .find(|f| f.id == *family_id && !f.archived)
            .ok_or_else(|| CoreError::NotFound {
                entity: "product family",
                id: family_id.clone(),
            })?
            .clone();

        self.state.select_family(family);
        match self.cache.load(family_id).await {
            Some(details) => self.state.details_loaded((*details).clone()),
            None => {
                let reason = match self.cache.state(family_id).await {
                    crate::cache::LoadState::Failed(reason) => reason,
                    _ => "no details available".to_string(),
                };
                self.state.details_failed(reason);
            }
        }
        Ok(())
    }

    pub fn choose_colour(&mut self, colour_id: &str) -> Result<(), CoreError> {
        self.state.select_colour(colour_id)
    }

    pub fn choose_size(&mut self, value: &str) -> Result<(), CoreError> {
        self.state.select_size(value)
    }

    pub fn back(&mut self) {
        self.state.back();
    }

    /// Submit the composed link to the sink. The state resets only after
    /// the sink resolves, so a failed submit leaves the composition
    /// intact for another attempt.
    pub async fn submit(&mut self, mode: SubmitMode) -> Result<ProductLink, CatalogError> {
        let link = self.state.preview(mode)?;
        self.sink.submit(vec![link.clone()]).await?;
        self.state.confirm_submitted();
        tracing::info!(
            family_id = %link.family_id,
            colour_id = %link.colour_id,
            scope = %link.size_scope,
            "Shot product link submitted"
        );
        Ok(link)
    }

    /// Create a family inline and splice it into the local list and the
    /// cache so it is immediately selectable.
    pub async fn create_family(&mut self, payload: NewFamily) -> Result<FamilyId, CatalogError> {
        let writer = self.writer()?;
        let family = writer.create_family(payload).await?;
        let details = callsheet_core::catalog::FamilyDetails {
            colourways: Vec::new(),
            sizes: family.sizes.clone(),
        };
        self.cache.seed(family.id.clone(), details).await;
        let id = family.id.clone();
        self.families.push(family);
        Ok(id)
    }

    /// Create a colourway for the family being composed and splice it
    /// into both the cache and the in-flight selection.
    pub async fn create_colourway(
        &mut self,
        payload: NewColourway,
    ) -> Result<Colourway, CatalogError> {
        let family_id = self
            .state
            .family()
            .map(|f| f.id.clone())
            .ok_or_else(|| CoreError::Conflict("No family is being composed".to_string()))?;
        let writer = self.writer()?;
        let colourway = writer.create_colourway(&family_id, payload).await?;
        self.cache
            .insert_colourway(&family_id, colourway.clone())
            .await?;
        self.state.add_colourway(colourway.clone())?;
        Ok(colourway)
    }

    fn writer(&self) -> Result<&Arc<dyn CatalogWriter>, CatalogError> {
        self.writer.as_ref().ok_or_else(|| {
            CoreError::Conflict("Inline catalog creation is not available".to_string()).into()
        })
    }
}

// ---------------------------------------------------------------------------
// Batch cart flow
// ---------------------------------------------------------------------------

/// Drives the batch selector: independent per-family rows feeding a
/// shared cart, submitted to the sink as one atomic batch.
pub struct CartSession {
    families: Vec<ProductFamily>,
    rows: HashMap<FamilyId, RowSelection>,
    cart: Cart,
    default_scope: DefaultScope,
    cache: Arc<FamilyDetailsCache>,
    sink: Arc<dyn SelectionSink>,
}

impl CartSession {
    /// The batch flow historically binds all sizes when a row is added
    /// with no size chosen; pass a different scope to override.
    pub fn new(
        families: Vec<ProductFamily>,
        cache: Arc<FamilyDetailsCache>,
        sink: Arc<dyn SelectionSink>,
    ) -> Self {
        Self::with_default_scope(families, cache, sink, DefaultScope::All)
    }

    pub fn with_default_scope(
        families: Vec<ProductFamily>,
        cache: Arc<FamilyDetailsCache>,
        sink: Arc<dyn SelectionSink>,
        default_scope: DefaultScope,
    ) -> Self {
        Self {
            families,
            rows: HashMap::new(),
            cart: Cart::new(),
            default_scope,
            cache,
            sink,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn row(&self, family_id: &FamilyId) -> RowSelection {
        self.rows.get(family_id).cloned().unwrap_or_default()
    }

    /// Warm the cache for the rows currently on screen. Loads run per
    /// family; each row shows its own spinner.
    pub fn load_visible(&self, family_ids: &[FamilyId]) {
        Arc::clone(&self.cache).ensure_all(family_ids);
    }

    /// Pick a colourway for a row by position in its selectable list.
    pub fn select_colour(&mut self, family_id: &FamilyId, index: usize) {
        self.rows
            .entry(family_id.clone())
            .or_default()
            .select_colour(index);
    }

    pub fn select_size(&mut self, family_id: &FamilyId, value: &str) {
        self.rows
            .entry(family_id.clone())
            .or_default()
            .select_size(value);
    }

    /// Move a row's current picks into the cart and reset the row.
    ///
    /// Requires the row's details to be loaded and a colourway picked;
    /// a duplicate `(family, colour, size, scope)` tuple is silently
    /// dropped.
    pub async fn add_to_cart(&mut self, family_id: &FamilyId) -> Result<CartOutcome, CatalogError> {
        let family = self
            .families
            .iter()
            .find(|f| f.id == *family_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "product family",
                id: family_id.clone(),
            })?;

        let details = self.cache.get(family_id).await.ok_or_else(|| {
            CoreError::Conflict(format!("Details for family '{family_id}' are not loaded"))
        })?;

        let row = self.rows.entry(family_id.clone()).or_default();
        let selectable = details.selectable_colourways();
        let colour = row
            .colour_index()
            .and_then(|i| selectable.get(i).copied())
            .ok_or_else(|| {
                CoreError::Conflict("Choose a colourway before adding to the cart".to_string())
            })?;

        let raw_size = row.size().to_string();
        if !raw_size.is_empty()
            && raw_size != callsheet_core::scope::ALL_SIZES
            && !colour.offers_size(&details.sizes, &raw_size)
        {
            return Err(CoreError::Validation(format!(
                "Size '{raw_size}' is not offered by colourway '{}'",
                colour.id
            ))
            .into());
        }

        let outcome = self
            .cart
            .add(family, colour, &raw_size, self.default_scope)?;
        self.rows.remove(family_id);
        Ok(outcome)
    }

    /// Remove one cart row by position.
    pub fn remove_from_cart(&mut self, index: usize) -> Result<ProductLink, CoreError> {
        self.cart.remove(index)
    }

    /// Submit the whole cart to the sink as one atomic batch.
    ///
    /// The cart is cleared only after the sink resolves Ok; on failure it
    /// is preserved unchanged for another attempt.
    pub async fn submit_all(&mut self) -> Result<usize, CatalogError> {
        if self.cart.is_empty() {
            return Err(CoreError::Conflict("The cart is empty".to_string()).into());
        }
        let links = self.cart.links().to_vec();
        let count = links.len();
        self.sink.submit(links).await?;
        self.cart.clear();
        tracing::info!(count, "Cart submitted");
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

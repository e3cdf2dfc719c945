//! Pure domain logic for shot product selection and reconciliation.
//!
//! Models the lifecycle of a shot's linked products: composing a
//! family+colourway+size selection (single-item and batch cart flows),
//! the persisted [`link::ProductLink`] record with its size-scope
//! invariants, inline colour/size mutation, and the shot's ordered link
//! list. No I/O and no async — the catalog boundary lives in the
//! `callsheet-catalog` crate.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod link;
pub mod link_list;
pub mod scope;
pub mod selection;
pub mod types;
pub mod view_state;

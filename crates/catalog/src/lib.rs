//! Async catalog boundary for the product selection subsystem.
//!
//! Provides the collaborator traits implemented by the hosting
//! application (detail loader, persistence sink, inline-create writer),
//! the per-family details cache with cancellation-aware loading, and the
//! session drivers that wire the pure `callsheet-core` state machines to
//! those collaborators.

pub mod cache;
pub mod error;
pub mod loader;
pub mod session;

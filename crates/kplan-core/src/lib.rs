//! Core types and trait definitions for kplan.
//!
//! Items, their enrichment records, enrichment jobs, and the store traits the
//! pipeline writes through. This crate is free of HTTP, database and runtime
//! dependencies; every other crate depends on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod enrichment;
pub mod error;
pub mod item;
pub mod job;
pub mod store;

pub use enrichment::{Analysis, EnrichmentRecord};
pub use error::{Error, Result, ValidationError};
pub use item::{EnrichmentUpdate, Item, ItemStatus, NewItem, UserTag};
pub use job::{AnalyzeItem, Job};

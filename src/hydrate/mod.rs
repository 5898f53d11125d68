//! Hydration - fold flat rows into nested, deduplicated entities
//!
//! Each row resolves its root entity by identity, then fills columns and
//! nested scopes. Identity lookups at every scope go through a hash index kept
//! alongside the ordered collection, so resolution stays O(1) amortized while
//! output keeps first-seen order.

mod record;
mod resolver;

pub mod engine;
pub mod writer;

pub use engine::{hydrate, Hydrator};
pub use writer::{ArrayWriter, LinesWriter};

//! Board domain model.
//!
//! # Responsibility
//! - Define the canonical column/task records owned by the board store.
//! - Define the typed patch shapes callers may use to update them.
//!
//! # Invariants
//! - Every record is identified by a store-generated `Uuid`.
//! - `order` is a dense zero-based rank among siblings (columns of the board,
//!   tasks of one column).

pub mod column;
pub mod task;

/// Records that carry a dense positional rank among their siblings.
pub trait Ordered {
    /// Current rank.
    fn order(&self) -> usize;
    /// Overwrites the rank.
    fn set_order(&mut self, order: usize);
}

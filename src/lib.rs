//! elem-collections: a chained hash table and a singly linked list over a
//! tagged `Element` value, with pluggable hash/equality strategies.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: small containers whose structure (chains, links, cursors) is
//!   explicit and easy to reason about, without raw pointers.
//! - Pieces:
//!   - Element: closed enum (int, float, shared string, opaque shared
//!     reference). Passed by value; cloning never copies payloads.
//!   - HashTable: bucket vector of sentinels, each heading a singly
//!     linked chain of entries stored in a slot arena. Strategy
//!     functions `HashFn`/`EqFn` are fixed at creation.
//!   - LinkedList: singly linked nodes in a slot arena with `head`, a
//!     designated `last` node for O(1) append, and a cached size.
//!   - ListIterator: detached cursor that checks the list's identity and
//!     structural generation on every call.
//!
//! Constraints
//! - Single-threaded: `Element` holds `Rc`, so containers are
//!   `!Send`/`!Sync`.
//! - Absence is a value (`Option`), never a panic. Out-of-range list
//!   inserts/removes are silent no-ops.
//! - Generational arena keys: an unlinked node's key never resolves to a
//!   later node that reuses its slot.
//!
//! Hash table growth
//! - Before every insert the post-insert load `(size + 1) / capacity` is
//!   compared to `LOAD_FACTOR_THRESHOLD` (1.0). Exceeding it, or having no
//!   buckets at all, doubles the capacity (zero grows to one). Resizing
//!   builds a fresh bucket vector, relinks every entry into it, then swaps
//!   it in. Capacity never shrinks.
//! - New keys are linked directly after their bucket's sentinel.
//! - Iteration order is bucket-then-chain and depends on capacity; it is
//!   not insertion order.
//!
//! Strategy contract
//! - `eq(a, b)` must imply `hash(a) == hash(b)`. Nothing checks this; a
//!   violating pair makes equal keys land in different chains.
//!
//! Iterator invalidation
//! - Appends, prepends, successful inserts and removes, and `clear` bump
//!   the list's generation. A cursor created before the bump answers
//!   `IteratorError::Stale` from then on. In-place value updates
//!   (`apply_to_all`, `get_mut`) do not invalidate cursors.
//!
//! Notes and non-goals
//! - No shrinking, no persistence, no thread safety.
//! - `has_value` compares values with `Element`'s structural equality,
//!   not with the table's key equality.

pub mod element;
pub mod hash_table;
mod hash_table_proptest;
pub mod linked_list;
pub mod list_iterator;

// Public surface
pub use element::{
    element_eq, element_hash, int_eq, int_hash, string_eq, string_sum_hash, Element, EqFn,
    HashFn, Opaque,
};
pub use hash_table::{HashTable, INITIAL_CAPACITY, LOAD_FACTOR_THRESHOLD};
pub use linked_list::LinkedList;
pub use list_iterator::{IteratorError, ListIterator};

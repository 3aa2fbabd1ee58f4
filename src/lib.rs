//! Stable Double-Ended Priority Queue for Rust
//!
//! This crate provides [`Depq`], a double-ended priority queue with stable
//! ordering and per-element [`Locator`] handles for random-access priority
//! updates and deletions.
//!
//! # Features
//!
//! - **Double-ended**: `find_min`/`find_max`/`find_minmax` and the matching
//!   delete operations on one queue
//! - **Stable**: elements with equal priority leave in insertion order from
//!   both ends
//! - **Locators**: every insertion returns a handle that tracks its element
//!   through all internal movement; update its priority or delete it in
//!   O(log n)
//! - **Adaptive layout**: the backing array is kept as a min-heap, a
//!   max-heap, or an interval heap depending on which ends are actually
//!   queried, and reshapes itself lazily
//! - **Utilities**: [`nlargest`]/[`nsmallest`] selection and a lazy stable
//!   k-way [`merge`], built on the queue
//!
//! # Example
//!
//! ```rust
//! use depq::Depq;
//!
//! let mut q = Depq::new();
//! q.insert("eat", 4);
//! q.insert("sleep", 1);
//! let code = q.insert("code", 2);
//!
//! assert_eq!(q.find_min(), Some("sleep"));
//! assert_eq!(q.find_max(), Some("eat"));
//!
//! q.update_priority(&code, 9, None).unwrap();
//! assert_eq!(q.delete_max(), Some("code"));
//! assert_eq!(q.delete_min(), Some("sleep"));
//! ```
//!
//! Priorities are compared with their natural order by default; any
//! [`Compare`] implementation (including a plain closure wrapped in
//! [`FnComparator`]) can be supplied instead via
//! [`Depq::with_comparator`].

pub mod error;
pub mod locator;
pub mod merge;
pub mod queue;
pub mod select;

mod binary;
mod interval;

pub use compare::{natural, Compare, Natural};

pub use error::DepqError;
pub use locator::Locator;
pub use merge::{merge, Merge};
pub use queue::{Depq, FnComparator};
pub use select::{nlargest, nlargest_by, nsmallest, nsmallest_by};

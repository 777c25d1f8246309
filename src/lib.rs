//! An ordered set backed by an in-memory B+ tree with a configurable branching factor.
//!
//! This crate provides [`BPlusTreeSet`], a set of totally ordered values where every element lives in the leaf
//! level and internal nodes only hold separator copies that route searches. Nodes split when they overflow and
//! borrow from or merge with a sibling when they underflow, so all leaves stay at the same depth.
//!
//! # Example
//!
//! ```
//! use bplus_tree_set::BPlusTreeSet;
//!
//! let mut set = BPlusTreeSet::with_branching_factor(4)?;
//! for n in [5, 1, 3, 9, 7] {
//!     set.insert(n);
//! }
//!
//! assert!(set.contains(&3));
//! assert_eq!(set.first(), Some(&1));
//! assert_eq!(set.last(), Some(&9));
//!
//! // Removing an absent element is a no-op.
//! assert!(!set.remove(&4));
//! assert!(set.remove(&9));
//!
//! // Elements come back in ascending order.
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 5, 7]);
//!
//! // The tree can be dumped for debugging.
//! assert_eq!(set.render(""), "[5]\n├─[1, 3]\n└─[5, 7]\n");
//! # Ok::<(), bplus_tree_set::Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - The library only requires `alloc`
//! - **`cli`** (default) - Builds the `bplus-demo` interactive console
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other through compact handles. Leaves are doubly linked so ordered
//! iteration walks the leaf level without touching internal nodes. Structural changes are reported at `trace`
//! level through the [`log`] facade.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod bplus_tree_set;

pub use bplus_tree_set::BPlusTreeSet;
pub use error::Error;

/// Branching factor used by [`BPlusTreeSet::new`].
pub const DEFAULT_BRANCHING_FACTOR: usize = 3;

/// Smallest branching factor accepted by [`BPlusTreeSet::with_branching_factor`].
pub const MIN_BRANCHING_FACTOR: usize = 3;

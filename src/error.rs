use core::fmt;

use crate::MIN_BRANCHING_FACTOR;

/// Errors reported when configuring a [`BPlusTreeSet`](crate::BPlusTreeSet).
///
/// Lookups and removals of absent elements are not errors; they report `false` or `None`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The requested branching factor is below [`MIN_BRANCHING_FACTOR`].
    ///
    /// With fewer than three children per node a split could leave one half without a valid minimum.
    InvalidConfig {
        /// The rejected branching factor.
        branching_factor: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig { branching_factor } => {
                write!(f, "invalid branching factor {branching_factor}: must be at least {MIN_BRANCHING_FACTOR}")
            }
        }
    }
}

impl core::error::Error for Error {}

//! Newtype id for recipes.
//!
//! The backend assigns recipe ids as unbounded naturals; every id it has ever
//! handed out fits in a `u64`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a recipe, assigned by the backend on creation.
///
/// Immutable once created. Renders as its decimal value, which is also the
/// parameter segment of recipe cache keys.
///
/// ```rust
/// # use recipe_box_core::RecipeId;
/// let id = RecipeId::new(7);
/// assert_eq!(id.to_string(), "7");
/// assert_eq!("7".parse::<RecipeId>().ok(), Some(id));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(u64);

impl RecipeId {
    /// Create a new ID from a u64 value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying u64 value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecipeId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

impl From<u64> for RecipeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<RecipeId> for u64 {
    fn from(id: RecipeId) -> Self {
        id.0
    }
}

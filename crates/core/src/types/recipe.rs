//! Recipe entity and its embedded values.

use serde::{Deserialize, Serialize};

use super::{PhotoBlob, Principal, RecipeId, Timestamp};

/// A single ingredient line. Has no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
}

impl Ingredient {
    #[must_use]
    pub fn new(name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
        }
    }
}

/// A comment on a recipe. Append-only: never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Principal,
    pub content: String,
    pub timestamp: Timestamp,
}

/// A recipe as returned by the backend.
///
/// `id` and `owner` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub description: String,
    pub owner: Principal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub steps: Vec<String>,
    pub ingredients: Vec<Ingredient>,
    pub photo: Option<PhotoBlob>,
    pub likes: Vec<Principal>,
    pub comments: Vec<Comment>,
}

impl Recipe {
    /// Number of distinct principals that liked the recipe.
    #[must_use]
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    #[must_use]
    pub fn is_liked_by(&self, principal: &Principal) -> bool {
        self.likes.contains(principal)
    }

    #[must_use]
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        &self.owner == principal
    }
}

/// Editable fields of a recipe, submitted on create and update.
///
/// Validation happens upstream in the form layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub photo: Option<PhotoBlob>,
}

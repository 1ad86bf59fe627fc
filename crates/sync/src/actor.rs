//! Contract of the remote backend actor.
//!
//! The actor is an opaque RPC stub: one async method per backend operation.
//! Transport, identity delegation and wire encoding are owned by whoever
//! implements this trait; the sync layer only depends on the signatures.

use async_trait::async_trait;
use recipe_box_core::{
    Principal, Product, Recipe, RecipeId, RecipeInput, Storefront, SupportLink, Timestamp,
    UserProfile, UserRole,
};
use thiserror::Error;

/// Errors returned by actor calls.
#[derive(Debug, Clone, Error)]
pub enum ActorError {
    /// The backend rejected or trapped on the call.
    #[error("{message}")]
    Rejected { message: String },

    /// The call never reached the backend, or its reply was lost.
    #[error("transport error: {0}")]
    Transport(String),

    /// Failure without any usable detail.
    #[error("actor call failed")]
    Unknown,
}

impl ActorError {
    /// Convenience constructor for backend rejections.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Human-readable message, if the error carries a non-empty one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } | Self::Transport(message) => {
                let trimmed = message.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            Self::Unknown => None,
        }
    }
}

/// Result alias for actor calls.
pub type ActorResult<T> = Result<T, ActorError>;

/// The backend's recipe, profile and storefront operations.
///
/// Calls are made on behalf of the identity the actor was created with
/// ("the caller").
#[async_trait]
pub trait RecipeActor: Send + Sync {
    // Recipes
    async fn get_all_recipes(&self) -> ActorResult<Vec<Recipe>>;
    /// Newest first. With `exclude_own`, the caller's recipes are omitted;
    /// anonymous callers get the unfiltered list.
    async fn get_recent_recipes(&self, exclude_own: bool) -> ActorResult<Vec<Recipe>>;
    async fn get_recipe(&self, id: RecipeId) -> ActorResult<Recipe>;
    async fn create_recipe(&self, input: RecipeInput) -> ActorResult<RecipeId>;
    async fn update_recipe(&self, id: RecipeId, input: RecipeInput) -> ActorResult<()>;
    async fn delete_recipe(&self, id: RecipeId) -> ActorResult<()>;

    // Likes and comments
    async fn has_user_liked_recipe(&self, id: RecipeId) -> ActorResult<bool>;
    async fn like_recipe(&self, id: RecipeId) -> ActorResult<()>;
    async fn unlike_recipe(&self, id: RecipeId) -> ActorResult<()>;
    async fn add_comment(
        &self,
        id: RecipeId,
        content: String,
        timestamp: Timestamp,
    ) -> ActorResult<()>;

    // Profiles and roles
    async fn get_caller_user_profile(&self) -> ActorResult<Option<UserProfile>>;
    async fn get_user_profile(&self, user: &Principal) -> ActorResult<Option<UserProfile>>;
    async fn save_caller_user_profile(&self, profile: UserProfile) -> ActorResult<()>;
    async fn get_caller_user_role(&self) -> ActorResult<UserRole>;
    async fn is_caller_admin(&self) -> ActorResult<bool>;
    async fn assign_caller_user_role(&self, user: &Principal, role: UserRole) -> ActorResult<()>;

    // Storefronts
    async fn get_user_storefront(&self, user: &Principal) -> ActorResult<Option<Storefront>>;
    async fn get_user_products(&self, user: &Principal) -> ActorResult<Vec<Product>>;
    async fn get_user_support_links(&self, user: &Principal) -> ActorResult<Vec<SupportLink>>;
    async fn save_or_update_storefront(&self, storefront: Storefront) -> ActorResult<()>;
    async fn delete_storefront(&self) -> ActorResult<()>;
}

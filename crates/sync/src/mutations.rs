//! Cache-invalidating writes.
//!
//! Every write makes exactly one actor call. On success it invalidates the
//! keys listed by [`WriteOp::invalidations`] and then notifies; on failure it
//! notifies and leaves the cache alone. Nothing is retried.

use std::future::Future;
use std::sync::Arc;

use recipe_box_core::{
    Principal, Product, RecipeId, RecipeInput, Storefront, SupportLink, Timestamp, UserProfile,
    UserRole,
};
use tracing::{info, instrument, warn};

use crate::actor::{ActorResult, RecipeActor};
use crate::cache::Invalidation;
use crate::client::SyncClient;
use crate::error::{Result, SyncError};
use crate::notify::Notification;

/// A write and the cache keys it makes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOp {
    /// New recipe owned by the caller.
    CreateRecipe,
    /// Replace a recipe's content.
    UpdateRecipe(RecipeId),
    DeleteRecipe(RecipeId),
    LikeRecipe(RecipeId),
    UnlikeRecipe(RecipeId),
    /// Comment on a recipe.
    AddComment(RecipeId),
    /// Create or replace the caller's profile.
    SaveCallerProfile,
    /// Create or replace the caller's storefront.
    SaveStorefront,
    DeleteStorefront,
    /// Admin-only role change for another user.
    AssignUserRole,
}

impl WriteOp {
    /// Short name used in logs, errors and notifications.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateRecipe => "create recipe",
            Self::UpdateRecipe(_) => "update recipe",
            Self::DeleteRecipe(_) => "delete recipe",
            Self::LikeRecipe(_) => "like recipe",
            Self::UnlikeRecipe(_) => "unlike recipe",
            Self::AddComment(_) => "add comment",
            Self::SaveCallerProfile => "save profile",
            Self::SaveStorefront => "save storefront",
            Self::DeleteStorefront => "delete storefront",
            Self::AssignUserRole => "assign user role",
        }
    }

    /// Keys to invalidate after the write succeeds.
    #[must_use]
    pub fn invalidations(&self) -> Vec<Invalidation> {
        match *self {
            Self::CreateRecipe | Self::DeleteRecipe(_) => {
                vec![Invalidation::AllRecipes, Invalidation::RecentRecipes]
            }
            Self::UpdateRecipe(id) => vec![
                Invalidation::AllRecipes,
                Invalidation::RecentRecipes,
                Invalidation::Recipe(id),
            ],
            Self::LikeRecipe(id) | Self::UnlikeRecipe(id) => vec![
                Invalidation::Recipe(id),
                Invalidation::AllRecipes,
                Invalidation::RecentRecipes,
                Invalidation::HasLiked(id),
            ],
            Self::AddComment(id) => vec![Invalidation::Recipe(id)],
            Self::SaveCallerProfile => vec![Invalidation::CallerProfile],
            Self::SaveStorefront | Self::DeleteStorefront => vec![Invalidation::CallerStorefront],
            Self::AssignUserRole => vec![Invalidation::CallerRole, Invalidation::IsCallerAdmin],
        }
    }

    /// Notification text on success. Likes and storefront saves are silent.
    #[must_use]
    pub const fn success_message(&self) -> Option<&'static str> {
        match self {
            Self::CreateRecipe => Some("Recipe created successfully!"),
            Self::UpdateRecipe(_) => Some("Recipe updated successfully!"),
            Self::DeleteRecipe(_) => Some("Recipe deleted successfully!"),
            Self::AddComment(_) => Some("Comment added successfully!"),
            Self::SaveCallerProfile => Some("Profile saved successfully!"),
            Self::DeleteStorefront => Some("Storefront deleted successfully"),
            Self::AssignUserRole => Some("Role assigned successfully"),
            Self::LikeRecipe(_) | Self::UnlikeRecipe(_) | Self::SaveStorefront => None,
        }
    }

    /// Error for a write that cannot be attempted.
    ///
    /// Storefront writes report a missing actor as such; everything else, and
    /// a missing identity, is `Unauthenticated`.
    #[must_use]
    pub const fn precondition_error(&self, has_actor: bool) -> SyncError {
        match self {
            Self::SaveStorefront | Self::DeleteStorefront if !has_actor => {
                SyncError::ActorUnavailable
            }
            _ => SyncError::Unauthenticated,
        }
    }

    /// Notification text on failure when the remote error carries no message.
    #[must_use]
    pub const fn fallback_error(&self) -> &'static str {
        match self {
            Self::CreateRecipe => "Failed to create recipe",
            Self::UpdateRecipe(_) => "Failed to update recipe",
            Self::DeleteRecipe(_) => "Failed to delete recipe",
            Self::LikeRecipe(_) => "Failed to like recipe",
            Self::UnlikeRecipe(_) => "Failed to unlike recipe",
            Self::AddComment(_) => "Failed to add comment",
            Self::SaveCallerProfile => "Failed to save profile",
            Self::SaveStorefront => "Failed to save storefront data",
            Self::DeleteStorefront => "Failed to delete storefront",
            Self::AssignUserRole => "Failed to assign role",
        }
    }
}

impl SyncClient {
    /// Run one actor write for `op`, then invalidate and notify.
    async fn mutate<T, F, Fut>(&self, op: WriteOp, call: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn RecipeActor>) -> Fut,
        Fut: Future<Output = ActorResult<T>>,
    {
        let state = self.state();
        let Some((actor, _caller)) = state.ready_caller() else {
            let err = op.precondition_error(state.ready_actor().is_some());
            warn!(operation = op.name(), error = %err, "Write rejected before actor call");
            self.notify(Notification::error(op.name(), err.user_message(op.fallback_error())));
            return Err(err);
        };

        match call(actor).await {
            Ok(value) => {
                for target in op.invalidations() {
                    self.cache().invalidate(&target).await;
                }
                info!(operation = op.name(), "Write succeeded");
                if let Some(message) = op.success_message() {
                    self.notify(Notification::success(op.name(), message));
                }
                Ok(value)
            }
            Err(source) => {
                let err = SyncError::Remote {
                    operation: op.name(),
                    source,
                };
                warn!(operation = op.name(), error = %err, "Write failed");
                self.notify(Notification::error(op.name(), err.user_message(op.fallback_error())));
                Err(err)
            }
        }
    }

    // =========================================================================
    // Recipes
    // =========================================================================

    /// Create a recipe owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Unauthenticated`] without calling the actor when no
    /// caller is connected, or [`SyncError::Remote`] if the actor rejects it.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_recipe(&self, input: RecipeInput) -> Result<RecipeId> {
        self.mutate(WriteOp::CreateRecipe, |actor| async move {
            actor.create_recipe(input).await
        })
        .await
    }

    /// Replace a recipe's content.
    ///
    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip(self, input), fields(recipe_id = %id))]
    pub async fn update_recipe(&self, id: RecipeId, input: RecipeInput) -> Result<()> {
        self.mutate(WriteOp::UpdateRecipe(id), |actor| async move {
            actor.update_recipe(id, input).await
        })
        .await
    }

    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip(self), fields(recipe_id = %id))]
    pub async fn delete_recipe(&self, id: RecipeId) -> Result<()> {
        self.mutate(WriteOp::DeleteRecipe(id), |actor| async move {
            actor.delete_recipe(id).await
        })
        .await
    }

    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip(self), fields(recipe_id = %id))]
    pub async fn like_recipe(&self, id: RecipeId) -> Result<()> {
        self.mutate(WriteOp::LikeRecipe(id), |actor| async move {
            actor.like_recipe(id).await
        })
        .await
    }

    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip(self), fields(recipe_id = %id))]
    pub async fn unlike_recipe(&self, id: RecipeId) -> Result<()> {
        self.mutate(WriteOp::UnlikeRecipe(id), |actor| async move {
            actor.unlike_recipe(id).await
        })
        .await
    }

    /// Comment on a recipe, stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip(self, content), fields(recipe_id = %id))]
    pub async fn add_comment(&self, id: RecipeId, content: impl Into<String>) -> Result<()> {
        self.add_comment_at(id, content, Timestamp::now()).await
    }

    /// Comment on a recipe with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip(self, content), fields(recipe_id = %id))]
    pub async fn add_comment_at(
        &self,
        id: RecipeId,
        content: impl Into<String>,
        timestamp: Timestamp,
    ) -> Result<()> {
        let content = content.into();
        self.mutate(WriteOp::AddComment(id), |actor| async move {
            actor.add_comment(id, content, timestamp).await
        })
        .await
    }

    // =========================================================================
    // Profiles and roles
    // =========================================================================

    /// Create or replace the caller's profile.
    ///
    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip(self, name))]
    pub async fn save_caller_profile(&self, name: impl Into<String>) -> Result<()> {
        let profile = UserProfile::new(name);
        self.mutate(WriteOp::SaveCallerProfile, |actor| async move {
            actor.save_caller_user_profile(profile).await
        })
        .await
    }

    /// Assign `role` to `user`. The actor enforces admin-only access.
    ///
    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip(self), fields(user = %user, role = %role))]
    pub async fn assign_user_role(&self, user: &Principal, role: UserRole) -> Result<()> {
        let user = user.clone();
        self.mutate(WriteOp::AssignUserRole, |actor| async move {
            actor.assign_caller_user_role(&user, role).await
        })
        .await
    }

    // =========================================================================
    // Storefronts
    // =========================================================================

    /// Create or replace the caller's storefront.
    ///
    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip_all, fields(links = support_links.len(), products = products.len()))]
    pub async fn save_storefront(
        &self,
        support_links: Vec<SupportLink>,
        products: Vec<Product>,
    ) -> Result<()> {
        let storefront = Storefront::new(support_links, products);
        self.mutate(WriteOp::SaveStorefront, |actor| async move {
            actor.save_or_update_storefront(storefront).await
        })
        .await
    }

    /// # Errors
    ///
    /// See [`SyncClient::create_recipe`].
    #[instrument(skip(self))]
    pub async fn delete_storefront(&self) -> Result<()> {
        self.mutate(WriteOp::DeleteStorefront, |actor| async move {
            actor.delete_storefront().await
        })
        .await
    }
}

//! Cached reads.
//!
//! Each read maps to one actor method and one [`QueryKey`]. Reads never fail:
//! when the session is not ready they return the type's default without
//! touching the actor, and when the actor call fails the error is logged and
//! the default becomes the resolved value.

use std::future::Future;

use recipe_box_core::{
    Principal, Product, Recipe, RecipeId, Storefront, SupportLink, UserProfile, UserRole,
};
use tracing::{instrument, warn};

use crate::actor::ActorResult;
use crate::cache::{Cached, QueryKey};
use crate::client::SyncClient;
use crate::error::{Result, SyncError};

/// State of the caller-profile read.
///
/// Separates "not checked yet" (`is_fetched == false`) from "checked, no
/// profile" (`is_fetched && profile.is_none()`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileQuery {
    pub profile: Option<UserProfile>,
    pub is_loading: bool,
    pub is_fetched: bool,
}

impl ProfileQuery {
    /// Whether an authenticated caller should be asked to create a profile.
    #[must_use]
    pub const fn needs_setup(&self, is_authenticated: bool) -> bool {
        is_authenticated && !self.is_loading && self.is_fetched && self.profile.is_none()
    }
}

impl SyncClient {
    /// Serve `key` from cache, or resolve it with `fetch`.
    async fn cached<T, F>(&self, key: QueryKey, fetch: F) -> T
    where
        T: Cached + Default,
        F: Future<Output = ActorResult<T>>,
    {
        let label = key.tag();
        let value = self
            .cache()
            .get_or_fetch(key, async move {
                match fetch.await {
                    Ok(value) => value.into_cache_value(),
                    Err(error) => {
                        warn!(query = label, error = %error, "Query failed, using default");
                        T::default().into_cache_value()
                    }
                }
            })
            .await;

        T::from_cache_value(value).unwrap_or_default()
    }

    // =========================================================================
    // Recipes
    // =========================================================================

    /// Every recipe.
    #[instrument(skip(self))]
    pub async fn all_recipes(&self) -> Vec<Recipe> {
        let Some(actor) = self.state().ready_actor() else {
            return Vec::new();
        };
        self.cached(QueryKey::AllRecipes, async move {
            actor.get_all_recipes().await
        })
        .await
    }

    /// Newest recipes first, optionally without the caller's own.
    #[instrument(skip(self))]
    pub async fn recent_recipes(&self, exclude_own: bool) -> Vec<Recipe> {
        let Some(actor) = self.state().ready_actor() else {
            return Vec::new();
        };
        self.cached(QueryKey::RecentRecipes { exclude_own }, async move {
            actor.get_recent_recipes(exclude_own).await
        })
        .await
    }

    /// A single recipe; `None` if it does not exist or cannot be fetched.
    #[instrument(skip(self), fields(recipe_id = %id))]
    pub async fn recipe(&self, id: RecipeId) -> Option<Recipe> {
        let actor = self.state().ready_actor()?;
        self.cached(QueryKey::Recipe(id), async move {
            actor.get_recipe(id).await.map(Some)
        })
        .await
    }

    /// Whether the caller has liked `id`. False while anonymous.
    #[instrument(skip(self), fields(recipe_id = %id))]
    pub async fn has_liked(&self, id: RecipeId) -> bool {
        let Some((actor, caller)) = self.state().ready_caller() else {
            return false;
        };
        let key = QueryKey::HasLiked { recipe: id, caller };
        self.cached(key, async move { actor.has_user_liked_recipe(id).await })
            .await
    }

    // =========================================================================
    // Profiles and roles
    // =========================================================================

    /// Fetch the caller's profile, ignoring session readiness.
    ///
    /// "No profile" and remote failures both resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActorUnavailable`] if no actor is installed.
    #[instrument(skip(self))]
    pub async fn fetch_caller_profile(&self) -> Result<Option<UserProfile>> {
        let actor = self.state().actor().ok_or(SyncError::ActorUnavailable)?;
        Ok(self
            .cached(QueryKey::CallerProfile, async move {
                actor.get_caller_user_profile().await
            })
            .await)
    }

    /// The caller's profile with loading and fetched flags.
    #[instrument(skip(self))]
    pub async fn caller_profile(&self) -> ProfileQuery {
        let state = self.state();
        if state.is_connecting() {
            return ProfileQuery {
                is_loading: true,
                ..ProfileQuery::default()
            };
        }
        if !state.is_ready() {
            return ProfileQuery::default();
        }

        match self.fetch_caller_profile().await {
            Ok(profile) => ProfileQuery {
                profile,
                is_loading: false,
                is_fetched: true,
            },
            Err(_) => ProfileQuery::default(),
        }
    }

    /// The caller's profile as currently cached, without fetching.
    ///
    /// Reports `is_loading` when the read is enabled but has not resolved.
    #[instrument(skip(self))]
    pub async fn peek_caller_profile(&self) -> ProfileQuery {
        let state = self.state();
        if state.is_connecting() {
            return ProfileQuery {
                is_loading: true,
                ..ProfileQuery::default()
            };
        }
        if !state.is_ready() {
            return ProfileQuery::default();
        }

        match self.cache().peek(&QueryKey::CallerProfile).await {
            Some(value) => ProfileQuery {
                profile: <Option<UserProfile>>::from_cache_value(value).flatten(),
                is_loading: false,
                is_fetched: true,
            },
            None => ProfileQuery {
                profile: None,
                is_loading: true,
                is_fetched: false,
            },
        }
    }

    /// Another user's profile.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn user_profile(&self, user: &Principal) -> Option<UserProfile> {
        let actor = self.state().ready_actor()?;
        let user = user.clone();
        self.cached(QueryKey::UserProfile(user.clone()), async move {
            actor.get_user_profile(&user).await
        })
        .await
    }

    /// The caller's backend role. `Guest` until known.
    #[instrument(skip(self))]
    pub async fn caller_role(&self) -> UserRole {
        let Some(actor) = self.state().ready_actor() else {
            return UserRole::Guest;
        };
        self.cached(QueryKey::CallerRole, async move {
            actor.get_caller_user_role().await
        })
        .await
    }

    /// Whether the caller is an admin.
    #[instrument(skip(self))]
    pub async fn is_caller_admin(&self) -> bool {
        let Some(actor) = self.state().ready_actor() else {
            return false;
        };
        self.cached(QueryKey::IsCallerAdmin, async move {
            actor.is_caller_admin().await
        })
        .await
    }

    // =========================================================================
    // Storefronts
    // =========================================================================

    /// The caller's own storefront. `None` while anonymous.
    #[instrument(skip(self))]
    pub async fn caller_storefront(&self) -> Option<Storefront> {
        let (actor, caller) = self.state().ready_caller()?;
        self.cached(QueryKey::CallerStorefront, async move {
            actor.get_user_storefront(&caller).await
        })
        .await
    }

    /// Another user's storefront.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn user_storefront(&self, user: &Principal) -> Option<Storefront> {
        let actor = self.state().ready_actor()?;
        let user = user.clone();
        self.cached(QueryKey::UserStorefront(user.clone()), async move {
            actor.get_user_storefront(&user).await
        })
        .await
    }

    /// Another user's product listings.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn user_products(&self, user: &Principal) -> Vec<Product> {
        let Some(actor) = self.state().ready_actor() else {
            return Vec::new();
        };
        let user = user.clone();
        self.cached(QueryKey::UserProducts(user.clone()), async move {
            actor.get_user_products(&user).await
        })
        .await
    }

    /// Another user's support links.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn user_support_links(&self, user: &Principal) -> Vec<SupportLink> {
        let Some(actor) = self.state().ready_actor() else {
            return Vec::new();
        };
        let user = user.clone();
        self.cached(QueryKey::UserSupportLinks(user.clone()), async move {
            actor.get_user_support_links(&user).await
        })
        .await
    }
}

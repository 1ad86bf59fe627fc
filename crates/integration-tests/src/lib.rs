//! Integration test support for the Recipe Box data-sync layer.
//!
//! [`InMemoryBackend`] is a complete in-process stand-in for the recipe
//! backend actor. It keeps real state (recipes, likes, comments, profiles,
//! roles, storefronts), counts every call, and can be told to fail a method.
//! Each caller talks to it through its own handle from
//! [`InMemoryBackend::actor_for`], so identity-dependent behavior matches the
//! real backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p recipe-box-integration-tests
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use recipe_box_core::{
    Comment, Principal, Product, Recipe, RecipeId, RecipeInput, Storefront, SupportLink,
    Timestamp, UserProfile, UserRole,
};
use recipe_box_sync::{
    ActorError, ActorResult, Notification, Notifier, QueryCache, RecipeActor, SyncClient,
    SyncConfig,
};

/// Number of entries returned by the recent-recipes listing.
pub const RECENT_LIMIT: usize = 20;

#[derive(Default)]
struct BackendState {
    recipes: BTreeMap<RecipeId, Recipe>,
    next_id: u64,
    clock: i64,
    profiles: HashMap<Principal, UserProfile>,
    roles: HashMap<Principal, UserRole>,
    storefronts: HashMap<Principal, Storefront>,
    failures: HashMap<&'static str, ActorError>,
    calls: HashMap<&'static str, usize>,
}

impl BackendState {
    fn tick(&mut self) -> Timestamp {
        self.clock += 1;
        Timestamp::from_millis(self.clock)
    }

    fn record(&mut self, method: &'static str) -> ActorResult<()> {
        *self.calls.entry(method).or_default() += 1;
        self.failures.get(method).cloned().map_or(Ok(()), Err)
    }

    fn recipe_mut(&mut self, id: RecipeId) -> ActorResult<&mut Recipe> {
        self.recipes
            .get_mut(&id)
            .ok_or_else(|| ActorError::rejected("Recipe not found"))
    }

    fn role_of(&self, caller: &Principal) -> UserRole {
        self.roles.get(caller).copied().unwrap_or(UserRole::User)
    }
}

/// Shared in-memory backend.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A handle that calls the backend as `caller` (`None` for anonymous).
    #[must_use]
    pub fn actor_for(&self, caller: Option<&Principal>) -> Arc<dyn RecipeActor> {
        Arc::new(BackendActor {
            backend: self.clone(),
            caller: caller.cloned(),
        })
    }

    /// Insert a recipe directly, bypassing call counting.
    pub fn seed_recipe(&self, owner: &Principal, input: RecipeInput) -> RecipeId {
        let mut state = self.lock();
        insert_recipe(&mut state, owner, input)
    }

    /// Make `caller` an admin.
    pub fn grant_admin(&self, caller: &Principal) {
        self.lock().roles.insert(caller.clone(), UserRole::Admin);
    }

    /// Fail every call to `method` with `error` until [`Self::clear_failures`].
    pub fn fail(&self, method: &'static str, error: ActorError) {
        self.lock().failures.insert(method, error);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Calls made to `method` so far.
    #[must_use]
    pub fn calls(&self, method: &str) -> usize {
        self.lock().calls.get(method).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    /// Stored state of a recipe, read without counting a call.
    #[must_use]
    pub fn stored_recipe(&self, id: RecipeId) -> Option<Recipe> {
        self.lock().recipes.get(&id).cloned()
    }
}

fn insert_recipe(state: &mut BackendState, owner: &Principal, input: RecipeInput) -> RecipeId {
    state.next_id += 1;
    let id = RecipeId::new(state.next_id);
    let now = state.tick();
    state.recipes.insert(
        id,
        Recipe {
            id,
            title: input.title,
            description: input.description,
            owner: owner.clone(),
            created_at: now,
            updated_at: now,
            steps: input.steps,
            ingredients: input.ingredients,
            photo: input.photo,
            likes: Vec::new(),
            comments: Vec::new(),
        },
    );
    id
}

struct BackendActor {
    backend: InMemoryBackend,
    caller: Option<Principal>,
}

impl BackendActor {
    fn caller(&self) -> ActorResult<&Principal> {
        self.caller
            .as_ref()
            .ok_or_else(|| ActorError::rejected("Unauthorized: Anonymous callers cannot do this"))
    }

    fn owned_recipe<'a>(
        &self,
        state: &'a mut BackendState,
        id: RecipeId,
        action: &str,
    ) -> ActorResult<&'a mut Recipe> {
        let caller = self.caller()?.clone();
        let recipe = state.recipe_mut(id)?;
        if recipe.is_owned_by(&caller) {
            Ok(recipe)
        } else {
            Err(ActorError::rejected(format!(
                "Unauthorized: Only the owner can {action} this recipe"
            )))
        }
    }
}

#[async_trait]
impl RecipeActor for BackendActor {
    async fn get_all_recipes(&self) -> ActorResult<Vec<Recipe>> {
        let mut state = self.backend.lock();
        state.record("get_all_recipes")?;
        Ok(state.recipes.values().cloned().collect())
    }

    async fn get_recent_recipes(&self, exclude_own: bool) -> ActorResult<Vec<Recipe>> {
        let mut state = self.backend.lock();
        state.record("get_recent_recipes")?;
        let mut recent: Vec<Recipe> = state
            .recipes
            .values()
            .filter(|recipe| {
                !(exclude_own && self.caller.as_ref().is_some_and(|c| recipe.is_owned_by(c)))
            })
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(RECENT_LIMIT);
        Ok(recent)
    }

    async fn get_recipe(&self, id: RecipeId) -> ActorResult<Recipe> {
        let mut state = self.backend.lock();
        state.record("get_recipe")?;
        state.recipe_mut(id).cloned()
    }

    async fn create_recipe(&self, input: RecipeInput) -> ActorResult<RecipeId> {
        let mut state = self.backend.lock();
        state.record("create_recipe")?;
        let owner = self.caller()?.clone();
        if input.title.trim().is_empty() {
            return Err(ActorError::rejected("Title is required"));
        }
        Ok(insert_recipe(&mut state, &owner, input))
    }

    async fn update_recipe(&self, id: RecipeId, input: RecipeInput) -> ActorResult<()> {
        let mut state = self.backend.lock();
        state.record("update_recipe")?;
        let now = state.tick();
        let recipe = self.owned_recipe(&mut state, id, "update")?;
        recipe.title = input.title;
        recipe.description = input.description;
        recipe.ingredients = input.ingredients;
        recipe.steps = input.steps;
        recipe.photo = input.photo;
        recipe.updated_at = now;
        Ok(())
    }

    async fn delete_recipe(&self, id: RecipeId) -> ActorResult<()> {
        let mut state = self.backend.lock();
        state.record("delete_recipe")?;
        self.owned_recipe(&mut state, id, "delete")?;
        state.recipes.remove(&id);
        Ok(())
    }

    async fn has_user_liked_recipe(&self, id: RecipeId) -> ActorResult<bool> {
        let mut state = self.backend.lock();
        state.record("has_user_liked_recipe")?;
        let caller = self.caller()?.clone();
        Ok(state.recipe_mut(id)?.is_liked_by(&caller))
    }

    async fn like_recipe(&self, id: RecipeId) -> ActorResult<()> {
        let mut state = self.backend.lock();
        state.record("like_recipe")?;
        let caller = self.caller()?.clone();
        let recipe = state.recipe_mut(id)?;
        if !recipe.is_liked_by(&caller) {
            recipe.likes.push(caller);
        }
        Ok(())
    }

    async fn unlike_recipe(&self, id: RecipeId) -> ActorResult<()> {
        let mut state = self.backend.lock();
        state.record("unlike_recipe")?;
        let caller = self.caller()?.clone();
        state.recipe_mut(id)?.likes.retain(|p| *p != caller);
        Ok(())
    }

    async fn add_comment(
        &self,
        id: RecipeId,
        content: String,
        timestamp: Timestamp,
    ) -> ActorResult<()> {
        let mut state = self.backend.lock();
        state.record("add_comment")?;
        let author = self.caller()?.clone();
        if content.trim().is_empty() {
            return Err(ActorError::rejected("Comment cannot be empty"));
        }
        state.recipe_mut(id)?.comments.push(Comment {
            author,
            content,
            timestamp,
        });
        Ok(())
    }

    async fn get_caller_user_profile(&self) -> ActorResult<Option<UserProfile>> {
        let mut state = self.backend.lock();
        state.record("get_caller_user_profile")?;
        Ok(self
            .caller
            .as_ref()
            .and_then(|caller| state.profiles.get(caller).cloned()))
    }

    async fn get_user_profile(&self, user: &Principal) -> ActorResult<Option<UserProfile>> {
        let mut state = self.backend.lock();
        state.record("get_user_profile")?;
        Ok(state.profiles.get(user).cloned())
    }

    async fn save_caller_user_profile(&self, profile: UserProfile) -> ActorResult<()> {
        let mut state = self.backend.lock();
        state.record("save_caller_user_profile")?;
        let caller = self.caller()?.clone();
        state.profiles.insert(caller, profile);
        Ok(())
    }

    async fn get_caller_user_role(&self) -> ActorResult<UserRole> {
        let mut state = self.backend.lock();
        state.record("get_caller_user_role")?;
        Ok(self
            .caller
            .as_ref()
            .map_or(UserRole::Guest, |caller| state.role_of(caller)))
    }

    async fn is_caller_admin(&self) -> ActorResult<bool> {
        let mut state = self.backend.lock();
        state.record("is_caller_admin")?;
        Ok(self
            .caller
            .as_ref()
            .is_some_and(|caller| state.role_of(caller) == UserRole::Admin))
    }

    async fn assign_caller_user_role(&self, user: &Principal, role: UserRole) -> ActorResult<()> {
        let mut state = self.backend.lock();
        state.record("assign_caller_user_role")?;
        let caller = self.caller()?.clone();
        if state.role_of(&caller) != UserRole::Admin {
            return Err(ActorError::rejected(
                "Unauthorized: Only admins can assign user roles",
            ));
        }
        state.roles.insert(user.clone(), role);
        Ok(())
    }

    async fn get_user_storefront(&self, user: &Principal) -> ActorResult<Option<Storefront>> {
        let mut state = self.backend.lock();
        state.record("get_user_storefront")?;
        Ok(state.storefronts.get(user).cloned())
    }

    async fn get_user_products(&self, user: &Principal) -> ActorResult<Vec<Product>> {
        let mut state = self.backend.lock();
        state.record("get_user_products")?;
        Ok(state
            .storefronts
            .get(user)
            .map(|s| s.products.clone())
            .unwrap_or_default())
    }

    async fn get_user_support_links(&self, user: &Principal) -> ActorResult<Vec<SupportLink>> {
        let mut state = self.backend.lock();
        state.record("get_user_support_links")?;
        Ok(state
            .storefronts
            .get(user)
            .map(|s| s.support_links.clone())
            .unwrap_or_default())
    }

    async fn save_or_update_storefront(&self, storefront: Storefront) -> ActorResult<()> {
        let mut state = self.backend.lock();
        state.record("save_or_update_storefront")?;
        let caller = self.caller()?.clone();
        state.storefronts.insert(caller, storefront);
        Ok(())
    }

    async fn delete_storefront(&self) -> ActorResult<()> {
        let mut state = self.backend.lock();
        state.record("delete_storefront")?;
        let caller = self.caller()?.clone();
        state
            .storefronts
            .remove(&caller)
            .map(|_| ())
            .ok_or_else(|| ActorError::rejected("Storefront not found"))
    }
}

/// Collects notifications for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn all(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages in arrival order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.all().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// A backend, a client connected to it as `caller`, and the client's
/// notifications.
pub struct TestContext {
    pub backend: InMemoryBackend,
    pub client: SyncClient,
    pub notifications: Arc<RecordingNotifier>,
}

impl TestContext {
    /// A client connected as `caller` (`None` for anonymous).
    pub async fn connected(caller: Option<&str>) -> Self {
        let backend = InMemoryBackend::new();
        let notifications = Arc::new(RecordingNotifier::default());
        let client = SyncClient::new(
            QueryCache::new(&SyncConfig::default()),
            notifications.clone(),
        );
        let caller = caller.map(principal);
        client
            .connect(backend.actor_for(caller.as_ref()), caller)
            .await;
        Self {
            backend,
            client,
            notifications,
        }
    }
}

/// Parse a principal, panicking on invalid test input.
///
/// # Panics
///
/// Panics if `text` is not a valid principal.
#[must_use]
pub fn principal(text: &str) -> Principal {
    match Principal::parse(text) {
        Ok(principal) => principal,
        Err(err) => panic!("invalid test principal {text:?}: {err}"),
    }
}

/// A recipe input with `ingredients` and `steps` placeholder entries.
#[must_use]
pub fn recipe_input(title: &str, ingredients: usize, steps: usize) -> RecipeInput {
    RecipeInput {
        title: title.to_string(),
        description: format!("{title} from the test kitchen"),
        ingredients: (1..=ingredients)
            .map(|i| recipe_box_core::Ingredient::new(format!("ingredient {i}"), "1 cup"))
            .collect(),
        steps: (1..=steps).map(|i| format!("step {i}")).collect(),
        photo: None,
    }
}

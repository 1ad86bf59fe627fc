//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use recipe_box_core::{
    Principal, Product, Recipe, RecipeId, RecipeInput, Storefront, SupportLink, Timestamp,
    UserProfile, UserRole,
};
use tokio::sync::Notify;

use crate::actor::{ActorError, ActorResult, RecipeActor};
use crate::cache::QueryCache;
use crate::client::SyncClient;
use crate::config::SyncConfig;
use crate::notify::{Notification, Notifier};

pub fn principal(text: &str) -> Principal {
    Principal::parse(text).expect("valid principal")
}

pub fn recipe(id: u64, title: &str, owner: &str) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        title: title.to_string(),
        description: String::new(),
        owner: principal(owner),
        created_at: Timestamp::from_millis(1),
        updated_at: Timestamp::from_millis(1),
        steps: Vec::new(),
        ingredients: Vec::new(),
        photo: None,
        likes: Vec::new(),
        comments: Vec::new(),
    }
}

pub fn client() -> (SyncClient, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let cache = QueryCache::new(&SyncConfig::default());
    (SyncClient::new(cache, notifier.clone()), notifier)
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().expect("notifier lock").clone()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().expect("notifier lock").is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().expect("notifier lock").push(notification);
    }
}

/// Holds reads inside the actor until released.
#[derive(Default)]
pub struct ReadGate {
    /// Signalled when a read reaches the actor.
    pub entered: Notify,
    pub release: Notify,
}

/// Actor double: serves a fixed recipe list, counts calls, and can be told to
/// fail reads or writes, or to hold reads at a gate.
#[derive(Default)]
pub struct StubActor {
    recipes: Vec<Recipe>,
    gate: Mutex<Option<Arc<ReadGate>>>,
    reads_fail: AtomicBool,
    write_error: Mutex<Option<ActorError>>,
    next_id: AtomicU64,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl StubActor {
    pub fn with_recipes(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes,
            ..Self::default()
        }
    }

    pub fn fail_reads(&self) {
        self.reads_fail.store(true, Ordering::SeqCst);
    }

    /// Hold every subsequent read until the returned gate is released.
    pub fn pause_reads(&self) -> Arc<ReadGate> {
        let gate = Arc::new(ReadGate::default());
        *self.gate.lock().expect("stub lock") = Some(Arc::clone(&gate));
        gate
    }

    pub fn resume_reads(&self) {
        *self.gate.lock().expect("stub lock") = None;
    }

    pub fn fail_writes(&self, error: ActorError) {
        *self.write_error.lock().expect("stub lock") = Some(error);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .expect("stub lock")
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().expect("stub lock").values().sum()
    }

    async fn read<T>(
        &self,
        method: &'static str,
        value: impl FnOnce() -> T + Send,
    ) -> ActorResult<T> {
        *self.calls.lock().expect("stub lock").entry(method).or_default() += 1;
        let gate = self.gate.lock().expect("stub lock").clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.reads_fail.load(Ordering::SeqCst) {
            return Err(ActorError::Transport("replica unreachable".to_string()));
        }
        Ok(value())
    }

    fn write<T>(&self, method: &'static str, value: impl FnOnce() -> T) -> ActorResult<T> {
        *self.calls.lock().expect("stub lock").entry(method).or_default() += 1;
        if let Some(error) = self.write_error.lock().expect("stub lock").clone() {
            return Err(error);
        }
        Ok(value())
    }
}

#[async_trait]
impl RecipeActor for StubActor {
    async fn get_all_recipes(&self) -> ActorResult<Vec<Recipe>> {
        self.read("get_all_recipes", || self.recipes.clone()).await
    }

    async fn get_recent_recipes(&self, _exclude_own: bool) -> ActorResult<Vec<Recipe>> {
        self.read("get_recent_recipes", || self.recipes.clone()).await
    }

    async fn get_recipe(&self, id: RecipeId) -> ActorResult<Recipe> {
        self.read("get_recipe", || self.recipes.iter().find(|r| r.id == id).cloned())
            .await?
            .ok_or_else(|| ActorError::rejected("Recipe not found"))
    }

    async fn create_recipe(&self, _input: RecipeInput) -> ActorResult<RecipeId> {
        self.write("create_recipe", || {
            RecipeId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
        })
    }

    async fn update_recipe(&self, _id: RecipeId, _input: RecipeInput) -> ActorResult<()> {
        self.write("update_recipe", || ())
    }

    async fn delete_recipe(&self, _id: RecipeId) -> ActorResult<()> {
        self.write("delete_recipe", || ())
    }

    async fn has_user_liked_recipe(&self, _id: RecipeId) -> ActorResult<bool> {
        self.read("has_user_liked_recipe", || false).await
    }

    async fn like_recipe(&self, _id: RecipeId) -> ActorResult<()> {
        self.write("like_recipe", || ())
    }

    async fn unlike_recipe(&self, _id: RecipeId) -> ActorResult<()> {
        self.write("unlike_recipe", || ())
    }

    async fn add_comment(
        &self,
        _id: RecipeId,
        _content: String,
        _timestamp: Timestamp,
    ) -> ActorResult<()> {
        self.write("add_comment", || ())
    }

    async fn get_caller_user_profile(&self) -> ActorResult<Option<UserProfile>> {
        self.read("get_caller_user_profile", || None).await
    }

    async fn get_user_profile(&self, _user: &Principal) -> ActorResult<Option<UserProfile>> {
        self.read("get_user_profile", || None).await
    }

    async fn save_caller_user_profile(&self, _profile: UserProfile) -> ActorResult<()> {
        self.write("save_caller_user_profile", || ())
    }

    async fn get_caller_user_role(&self) -> ActorResult<UserRole> {
        self.read("get_caller_user_role", || UserRole::User).await
    }

    async fn is_caller_admin(&self) -> ActorResult<bool> {
        self.read("is_caller_admin", || false).await
    }

    async fn assign_caller_user_role(&self, _user: &Principal, _role: UserRole) -> ActorResult<()> {
        self.write("assign_caller_user_role", || ())
    }

    async fn get_user_storefront(&self, _user: &Principal) -> ActorResult<Option<Storefront>> {
        self.read("get_user_storefront", || None).await
    }

    async fn get_user_products(&self, _user: &Principal) -> ActorResult<Vec<Product>> {
        self.read("get_user_products", Vec::new).await
    }

    async fn get_user_support_links(&self, _user: &Principal) -> ActorResult<Vec<SupportLink>> {
        self.read("get_user_support_links", Vec::new).await
    }

    async fn save_or_update_storefront(&self, _storefront: Storefront) -> ActorResult<()> {
        self.write("save_or_update_storefront", || ())
    }

    async fn delete_storefront(&self) -> ActorResult<()> {
        self.write("delete_storefront", || ())
    }
}

//! The sync client: shared handle over session, cache and notifier.

use std::sync::Arc;

use recipe_box_core::Principal;
use tracing::{debug, info};

use crate::actor::RecipeActor;
use crate::cache::{Invalidation, QueryCache};
use crate::notify::{Notification, Notifier};
use crate::session::{Session, SessionState};

/// Entry point of the data-sync layer.
///
/// Reads live in [`crate::queries`], writes in [`crate::mutations`]. The
/// client is cheaply cloneable via `Arc`; every clone shares the same session,
/// cache and notifier.
///
/// # Example
///
/// ```rust,ignore
/// let cache = QueryCache::new(&config);
/// let client = SyncClient::new(cache, Arc::new(TracingNotifier));
/// client.connect(actor, Some(caller)).await;
///
/// let recipes = client.all_recipes().await;
/// let id = client.create_recipe(input).await?;
/// ```
#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<SyncClientInner>,
}

struct SyncClientInner {
    session: Session,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl SyncClient {
    /// Create a client over an existing cache.
    #[must_use]
    pub fn new(cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(SyncClientInner {
                session: Session::new(),
                cache,
                notifier,
            }),
        }
    }

    /// Get a reference to the query cache.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Get a reference to the session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub(crate) fn state(&self) -> SessionState {
        self.inner.session.snapshot()
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.inner.notifier.notify(notification);
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Mark the actor as being (re-)established.
    pub fn begin_connecting(&self) {
        debug!("Actor connecting");
        self.inner.session.begin_connecting();
    }

    /// Install an actor for `identity` (`None` for anonymous access).
    ///
    /// Caller-scoped entries are dropped when the identity changes.
    pub async fn connect(&self, actor: Arc<dyn RecipeActor>, identity: Option<Principal>) {
        let authenticated = identity.is_some();
        if self.inner.session.connect(actor, identity) {
            self.inner.cache.invalidate(&Invalidation::CallerScoped).await;
        }
        info!(authenticated, "Actor connected");
    }

    /// Drop the actor and identity, forgetting caller-scoped entries.
    pub async fn disconnect(&self) {
        if self.inner.session.disconnect() {
            self.inner.cache.invalidate(&Invalidation::CallerScoped).await;
        }
        info!("Actor disconnected");
    }

    /// A caller identity is known.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Reads may be issued.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Writes may be issued.
    #[must_use]
    pub fn can_write(&self) -> bool {
        self.state().ready_caller().is_some()
    }

    /// Tear down: drop the session and every cached entry.
    pub async fn shutdown(&self) {
        self.inner.session.disconnect();
        self.inner.cache.shutdown().await;
        info!("Sync client shut down");
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("session", &self.inner.session.snapshot())
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryKey;
    use crate::test_support::{StubActor, client, principal};

    #[tokio::test]
    async fn test_identity_switch_discards_previous_callers_read() {
        let (client, _) = client();
        let actor = Arc::new(StubActor::default());
        client.connect(actor.clone(), Some(principal("alice"))).await;

        let gate = actor.pause_reads();
        let reader = {
            let client = client.clone();
            tokio::spawn(async move { client.caller_storefront().await })
        };
        gate.entered.notified().await;

        client.connect(actor.clone(), Some(principal("bob"))).await;
        gate.release.notify_one();
        reader.await.expect("reader task");

        assert!(client.cache().peek(&QueryKey::CallerStorefront).await.is_none());

        actor.resume_reads();
        client.caller_storefront().await;
        assert_eq!(actor.calls("get_user_storefront"), 2);
    }

    #[tokio::test]
    async fn test_same_identity_reconnect_keeps_cache() {
        let (client, _) = client();
        let actor = Arc::new(StubActor::default());
        client.connect(actor.clone(), Some(principal("alice"))).await;
        client.caller_role().await;
        let epoch = client.cache().epoch();

        client.connect(actor.clone(), Some(principal("alice"))).await;
        client.caller_role().await;

        assert_eq!(actor.calls("get_caller_user_role"), 1);
        assert_eq!(client.cache().epoch(), epoch);
    }
}

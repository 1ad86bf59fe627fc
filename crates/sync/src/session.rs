//! Actor connection and caller identity.
//!
//! The session decides whether an operation may be attempted at all. Reads
//! need a connected actor; caller-scoped reads and every write also need a
//! known identity. The view layer sees this only as derived booleans.

use std::sync::Arc;

use recipe_box_core::Principal;
use tokio::sync::watch;

use crate::actor::RecipeActor;

/// Snapshot of the connection state.
#[derive(Clone, Default)]
pub struct SessionState {
    actor: Option<Arc<dyn RecipeActor>>,
    identity: Option<Principal>,
    connecting: bool,
}

impl SessionState {
    /// An actor exists and is not being re-established.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.actor.is_some() && !self.connecting
    }

    /// A caller identity is known.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The actor connection is being (re-)established.
    #[must_use]
    pub const fn is_connecting(&self) -> bool {
        self.connecting
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Principal> {
        self.identity.as_ref()
    }

    /// The actor, if present, regardless of readiness.
    #[must_use]
    pub fn actor(&self) -> Option<Arc<dyn RecipeActor>> {
        self.actor.clone()
    }

    /// The actor, if it may be called now.
    #[must_use]
    pub fn ready_actor(&self) -> Option<Arc<dyn RecipeActor>> {
        if self.connecting {
            return None;
        }
        self.actor.clone()
    }

    /// The actor and caller identity, if both are available.
    #[must_use]
    pub fn ready_caller(&self) -> Option<(Arc<dyn RecipeActor>, Principal)> {
        let actor = self.ready_actor()?;
        let identity = self.identity.clone()?;
        Some((actor, identity))
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("actor", &self.actor.as_ref().map(|_| "<actor>"))
            .field("identity", &self.identity)
            .field("connecting", &self.connecting)
            .finish()
    }
}

/// Observable connection state.
#[derive(Debug)]
pub struct Session {
    state: watch::Sender<SessionState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Mark the actor as being (re-)established. Gated operations are
    /// skipped until [`Session::connect`].
    pub fn begin_connecting(&self) {
        self.state.send_modify(|state| state.connecting = true);
    }

    /// Install an actor for `identity` (`None` for anonymous access).
    ///
    /// Returns true when the identity differs from the previous one.
    pub fn connect(&self, actor: Arc<dyn RecipeActor>, identity: Option<Principal>) -> bool {
        let previous = self.state.send_replace(SessionState {
            actor: Some(actor),
            identity: identity.clone(),
            connecting: false,
        });
        previous.identity != identity
    }

    /// Drop the actor and identity.
    ///
    /// Returns true when an identity was cleared.
    pub fn disconnect(&self) -> bool {
        let previous = self.state.send_replace(SessionState::default());
        previous.identity.is_some()
    }
}

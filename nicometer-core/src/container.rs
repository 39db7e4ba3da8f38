//! The parent that live sessions are attached to.

use tracing::debug;

use crate::error::{MeterError, Result};
use crate::session::Session;
use crate::types::ids::SessionId;

/// Most sessions alive at once: the outgoing and incoming one of a reset.
pub const MAX_LIVE_SESSIONS: usize = 2;

/// Live sessions in render order, oldest first.
#[derive(Debug, Default)]
pub struct SessionContainer {
    sessions: Vec<Session>,
}

impl SessionContainer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(&mut self, mut session: Session) {
        debug_assert!(
            self.sessions.len() < MAX_LIVE_SESSIONS,
            "container already holds {} sessions",
            self.sessions.len()
        );
        session.set_attached(true);
        debug!(
            session = %session.id(),
            live = self.sessions.len() + 1,
            "session attached"
        );
        self.sessions.push(session);
    }

    /// Remove a session, handing it back detached.
    pub(crate) fn detach(&mut self, id: SessionId) -> Result<Session> {
        let index = self
            .sessions
            .iter()
            .position(|session| session.id() == id)
            .ok_or(MeterError::TeardownRace { session: id })?;
        let mut session = self.sessions.remove(index);
        session.set_attached(false);
        debug!(session = %id, live = self.sessions.len(), "session detached");
        Ok(session)
    }

    /// Live session by id.
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|session| session.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|session| session.id() == id)
    }

    /// Whether `id` is still attached.
    pub fn contains(&self, id: SessionId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// No session attached.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Live sessions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    /// Newest session that is not on its way out.
    pub fn current(&self) -> Option<&Session> {
        self.sessions.iter().rev().find(|session| !session.is_retiring())
    }

    /// Id of [`SessionContainer::current`].
    pub fn current_id(&self) -> Option<SessionId> {
        self.current().map(Session::id)
    }
}

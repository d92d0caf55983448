//! # In-Memory Session Repository
//!
//! DashMap-backed implementation of [`SessionRepository`]. Contents are lost
//! on restart.

use crate::domain::entities::{KycSession, SessionId};
use crate::domain::errors::SessionError;
use crate::ports::outbound::SessionRepository;
use dashmap::DashMap;

/// Process-local session storage.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: DashMap<SessionId, KycSession>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn get(&self, id: &SessionId) -> Option<KycSession> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    fn put(&self, session: KycSession) {
        self.sessions.insert(session.session_id, session);
    }

    fn update(
        &self,
        id: &SessionId,
        mutate: &mut dyn FnMut(&mut KycSession) -> Result<(), SessionError>,
    ) -> Result<KycSession, SessionError> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or(SessionError::NotFound(*id))?;
        mutate(entry.value_mut())?;
        Ok(entry.value().clone())
    }

    fn remove(&self, id: &SessionId) -> Option<KycSession> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    fn remove_if(
        &self,
        id: &SessionId,
        predicate: &dyn Fn(&KycSession) -> bool,
    ) -> Option<KycSession> {
        self.sessions
            .remove_if(id, |_, session| predicate(session))
            .map(|(_, session)| session)
    }

    fn retain(&self, keep: &dyn Fn(&KycSession) -> bool) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| keep(session));
        before.saturating_sub(self.sessions.len())
    }

    fn find(&self, predicate: &dyn Fn(&KycSession) -> bool) -> Vec<KycSession> {
        self.sessions
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::{
    foundation::clock::{Clock, MonotonicClock},
    foundation::core::SessionId,
    foundation::error::SceneResult,
    session::canvas_session::{CanvasSession, TickReport},
    session::config::SessionOpts,
};

/// Owns every open canvas session. Sessions share only the clock.
pub struct SessionHost {
    clock: Rc<dyn Clock>,
    sessions: BTreeMap<SessionId, CanvasSession>,
    next_id: u64,
}

impl std::fmt::Debug for SessionHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHost")
            .field("sessions", &self.sessions.keys().collect::<Vec<_>>())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl SessionHost {
    pub fn new() -> Self {
        Self::with_clock(Rc::new(MonotonicClock::new()))
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            sessions: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn open(&mut self, opts: SessionOpts) -> SceneResult<SessionId> {
        let id = SessionId(self.next_id);
        let session = CanvasSession::open_with_clock(id, opts, Rc::clone(&self.clock))?;
        self.next_id += 1;
        self.sessions.insert(id, session);
        Ok(id)
    }

    pub fn get(&self, id: SessionId) -> Option<&CanvasSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut CanvasSession> {
        self.sessions.get_mut(&id)
    }

    /// Disposes and forgets a session. Returns whether it was open.
    pub fn close(&mut self, id: SessionId) -> bool {
        match self.sessions.remove(&id) {
            Some(mut s) => {
                s.dispose();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.keys().copied()
    }

    /// Ticks every session in id order.
    pub fn tick_all(&mut self) -> SceneResult<Vec<(SessionId, TickReport)>> {
        self.sessions
            .iter_mut()
            .map(|(id, s)| Ok((*id, s.tick()?)))
            .collect()
    }
}

impl Default for SessionHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionHost {
    fn drop(&mut self) {
        for s in self.sessions.values_mut() {
            s.dispose();
        }
    }
}

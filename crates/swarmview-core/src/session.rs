//! Session fencing.
//!
//! Exactly one simulation run is "current" at a time. Every inbound message
//! carries a [`SessionId`]; anything tagged with a different id is stale
//! data from an overlapping or superseded run and is dropped silently with
//! a diagnostic log. This is routine filtering, not an error condition.

use swarmview_types::SessionId;
use tracing::debug;

/// Admits or rejects inbound data based on the current session tag.
#[derive(Debug, Default)]
pub struct SessionFence {
    active: Option<SessionId>,
}

impl SessionFence {
    /// Create a fence with no active session.
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Make `id` the current session. Anything buffered for a previous run
    /// is the caller's to discard.
    pub fn begin(&mut self, id: SessionId) {
        if let Some(previous) = self.active {
            debug!(previous = %previous, next = %id, "Superseding active session");
        }
        self.active = Some(id);
    }

    /// Clear the current session to none.
    pub fn end(&mut self) {
        self.active = None;
    }

    /// The currently active session, if any.
    pub const fn active(&self) -> Option<SessionId> {
        self.active
    }

    /// Whether `id` tags the currently active session.
    pub fn is_current(&self, id: &SessionId) -> bool {
        self.active.as_ref() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_session_admits_nothing() {
        let fence = SessionFence::new();
        assert!(fence.active().is_none());
        assert!(!fence.is_current(&SessionId::new()));
    }

    #[test]
    fn begin_makes_exactly_one_session_current() {
        let mut fence = SessionFence::new();
        let a = SessionId::new();
        let b = SessionId::new();
        fence.begin(a);
        assert!(fence.is_current(&a));
        assert!(!fence.is_current(&b));
        assert_eq!(fence.active(), Some(a));
    }

    #[test]
    fn begin_supersedes_previous_session() {
        let mut fence = SessionFence::new();
        let a = SessionId::new();
        let b = SessionId::new();
        fence.begin(a);
        fence.begin(b);
        assert!(!fence.is_current(&a));
        assert!(fence.is_current(&b));
    }

    #[test]
    fn end_clears_to_none() {
        let mut fence = SessionFence::new();
        let a = SessionId::new();
        fence.begin(a);
        fence.end();
        assert!(fence.active().is_none());
        assert!(!fence.is_current(&a));
    }
}

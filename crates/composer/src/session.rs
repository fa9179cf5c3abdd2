//! Lifecycle of one generation call.
//!
//! `Idle → Requesting → Streaming → {Completed | Failed}`. The accumulated
//! text only ever grows by appending fragments, and nothing happens after a
//! terminal state.

use shared::WritingMode;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Request issued, no fragment yet
    Requesting,
    Streaming,
    Completed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Failed)
    }
}

#[derive(Debug)]
pub struct GenerationSession {
    id: Uuid,
    mode: WritingMode,
    state: SessionState,
    accumulated: String,
    fragments: usize,
    error: Option<String>,
    started_at: Option<Instant>,
}

impl GenerationSession {
    pub fn new(mode: WritingMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            state: SessionState::Idle,
            accumulated: String::new(),
            fragments: 0,
            error: None,
            started_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> WritingMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, SessionState::Requesting | SessionState::Streaming)
    }

    pub fn text(&self) -> &str {
        &self.accumulated
    }

    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Mark the outbound request as issued.
    pub fn begin(&mut self) {
        if self.state == SessionState::Idle {
            self.started_at = Some(Instant::now());
            self.transition(SessionState::Requesting);
        }
    }

    /// Append a fragment and return the full text so far.
    ///
    /// Empty fragments and fragments arriving after a terminal state are
    /// dropped and yield `None`.
    pub fn push(&mut self, fragment: &str) -> Option<&str> {
        if fragment.is_empty() || !self.is_streaming() {
            return None;
        }
        if self.state == SessionState::Requesting {
            self.transition(SessionState::Streaming);
        }
        self.accumulated.push_str(fragment);
        self.fragments += 1;
        Some(&self.accumulated)
    }

    /// Finish normally, handing back the accumulated text.
    pub fn complete(&mut self) -> String {
        if self.is_streaming() {
            self.transition(SessionState::Completed);
        }
        self.accumulated.clone()
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        if !self.state.is_terminal() {
            self.error = Some(error.into());
            self.transition(SessionState::Failed);
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(session = %self.id, mode = %self.mode, from = ?self.state, to = ?next, "session state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut session = GenerationSession::new(WritingMode::Draft);
        assert_eq!(session.state(), SessionState::Idle);

        session.begin();
        assert_eq!(session.state(), SessionState::Requesting);
        assert!(session.is_streaming());

        assert_eq!(session.push("Hello"), Some("Hello"));
        assert_eq!(session.state(), SessionState::Streaming);
        assert_eq!(session.push(", world"), Some("Hello, world"));

        assert_eq!(session.complete(), "Hello, world");
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.fragments(), 2);
    }

    #[test]
    fn test_zero_fragments_completes_from_requesting() {
        let mut session = GenerationSession::new(WritingMode::Refine);
        session.begin();
        assert_eq!(session.complete(), "");
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn test_empty_fragment_is_ignored() {
        let mut session = GenerationSession::new(WritingMode::Academic);
        session.begin();
        assert_eq!(session.push(""), None);
        assert_eq!(session.state(), SessionState::Requesting);
        assert_eq!(session.fragments(), 0);
    }

    #[test]
    fn test_nothing_happens_after_failure() {
        let mut session = GenerationSession::new(WritingMode::Critique);
        session.begin();
        session.push("partial");
        session.fail("connection reset");
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.error(), Some("connection reset"));

        assert_eq!(session.push("more"), None);
        session.complete();
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.text(), "partial");
    }

    #[test]
    fn test_push_before_begin_is_dropped() {
        let mut session = GenerationSession::new(WritingMode::Draft);
        assert_eq!(session.push("early"), None);
        assert_eq!(session.text(), "");
    }
}

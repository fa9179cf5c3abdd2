//! UI-agnostic editor state
//!
//! Holds what the writing screen shows (input, output, mode, error) and the
//! rules for moving between those states. Any front end drives it with
//! [`WritingState::begin_generation`] and feeds back [`SessionEvent`]s from
//! the generation it started.

use crate::prompts;
use shared::WritingMode;
use tracing::debug;
use uuid::Uuid;

/// Everything a background generation needs, handed out when one starts.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    pub session_id: Uuid,
    pub mode: WritingMode,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Full text so far
    Snapshot(String),
    Completed(String),
    /// User-facing failure message
    Failed(String),
}

/// A progress report for a ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub session_id: Uuid,
    pub update: SessionUpdate,
}

impl SessionEvent {
    pub fn new(session_id: Uuid, update: SessionUpdate) -> Self {
        Self { session_id, update }
    }
}

/// What the output area should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputView<'a> {
    AwaitingInstructions,
    /// Request sent, nothing back yet
    Thinking,
    /// `complete` is false for text still streaming or cut off by abandoning
    Text {
        text: &'a str,
        streaming: bool,
        complete: bool,
    },
    Error(&'a str),
}

#[derive(Debug, Default)]
pub struct WritingState {
    pub input_text: String,
    output_text: String,
    mode: WritingMode,
    error: Option<String>,
    active_session: Option<Uuid>,
    /// Set only when the provider finished the response
    completed: bool,
}

impl WritingState {
    pub fn new(mode: WritingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> WritingMode {
        self.mode
    }

    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_streaming(&self) -> bool {
        self.active_session.is_some()
    }

    pub fn active_session(&self) -> Option<Uuid> {
        self.active_session
    }

    /// Switch modes. An empty input area is pre-filled with the new mode's
    /// sample; existing text is left alone.
    pub fn select_mode(&mut self, mode: WritingMode) {
        self.mode = mode;
        self.error = None;
        if self.input_text.is_empty() {
            self.input_text = prompts::sample(mode).to_string();
        }
    }

    /// Whether the generate trigger should be enabled.
    pub fn can_generate(&self) -> bool {
        !self.is_streaming() && !self.input_text.trim().is_empty()
    }

    /// Copying makes sense only once a response is complete.
    pub fn can_copy(&self) -> bool {
        self.completed && self.error.is_none() && !self.output_text.is_empty()
    }

    /// Start a generation for the current input and mode, clearing the
    /// previous output. Returns `None` while one is already running or when
    /// there is nothing to send.
    pub fn begin_generation(&mut self) -> Option<GenerationTicket> {
        if !self.can_generate() {
            return None;
        }
        let session_id = Uuid::new_v4();
        self.active_session = Some(session_id);
        self.output_text.clear();
        self.error = None;
        self.completed = false;
        Some(GenerationTicket {
            session_id,
            mode: self.mode,
            input: self.input_text.clone(),
        })
    }

    /// Stop caring about the running generation. The request itself keeps
    /// going; its remaining events are ignored. Any partial text stays on
    /// screen but is never treated as complete.
    pub fn abandon(&mut self) {
        if let Some(id) = self.active_session.take() {
            debug!(session = %id, "generation abandoned");
        }
    }

    /// Apply an event. Returns `false` when it belongs to a session that is
    /// no longer active.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        if self.active_session != Some(event.session_id) {
            debug!(session = %event.session_id, "dropping stale session event");
            return false;
        }
        match event.update {
            SessionUpdate::Snapshot(text) => self.output_text = text,
            SessionUpdate::Completed(text) => {
                self.output_text = text;
                self.active_session = None;
                self.completed = true;
            }
            SessionUpdate::Failed(message) => {
                self.error = Some(message);
                self.active_session = None;
            }
        }
        true
    }

    pub fn output_view(&self) -> OutputView<'_> {
        if let Some(error) = &self.error {
            OutputView::Error(error)
        } else if !self.output_text.is_empty() {
            OutputView::Text {
                text: &self.output_text,
                streaming: self.is_streaming(),
                complete: self.completed,
            }
        } else if self.is_streaming() {
            OutputView::Thinking
        } else {
            OutputView::AwaitingInstructions
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_switch_seeds_empty_input() {
        for from in WritingMode::all() {
            for to in WritingMode::all() {
                let mut state = WritingState::new(*from);
                state.select_mode(*to);
                assert_eq!(state.mode(), *to);
                assert_eq!(state.input_text, prompts::sample(*to));
            }
        }
    }

    #[test]
    fn test_mode_switch_keeps_existing_text() {
        for from in WritingMode::all() {
            for to in WritingMode::all() {
                let mut state = WritingState::new(*from);
                state.input_text = "my own essay topic".into();
                state.select_mode(*to);
                assert_eq!(state.input_text, "my own essay topic");
            }
        }
    }

    #[test]
    fn test_mode_switch_clears_error() {
        let mut state = WritingState::new(WritingMode::Draft);
        state.input_text = "x".into();
        let ticket = state.begin_generation().unwrap();
        state.apply(SessionEvent::new(
            ticket.session_id,
            SessionUpdate::Failed("boom".into()),
        ));
        assert_eq!(state.error(), Some("boom"));

        state.select_mode(WritingMode::Refine);
        assert!(state.error().is_none());
    }

    #[test]
    fn test_blank_input_cannot_start() {
        let mut state = WritingState::new(WritingMode::Draft);
        state.input_text = "   ".into();
        assert!(!state.can_generate());
        assert!(state.begin_generation().is_none());
        assert!(!state.is_streaming());
    }

    #[test]
    fn test_full_generation_cycle() {
        let mut state = WritingState::new(WritingMode::Critique);
        state.input_text = "claim".into();
        assert_eq!(state.output_view(), OutputView::AwaitingInstructions);

        let ticket = state.begin_generation().unwrap();
        assert_eq!(ticket.mode, WritingMode::Critique);
        assert_eq!(ticket.input, "claim");
        assert!(state.is_streaming());
        assert!(!state.can_generate());
        assert!(state.begin_generation().is_none());
        assert_eq!(state.output_view(), OutputView::Thinking);

        let id = ticket.session_id;
        assert!(state.apply(SessionEvent::new(id, SessionUpdate::Snapshot("Weak".into()))));
        assert_eq!(
            state.output_view(),
            OutputView::Text {
                text: "Weak",
                streaming: true,
                complete: false,
            }
        );
        assert!(!state.can_copy());

        assert!(state.apply(SessionEvent::new(
            id,
            SessionUpdate::Completed("Weak claim.".into())
        )));
        assert!(!state.is_streaming());
        assert!(state.can_copy());
        assert_eq!(state.output_text(), "Weak claim.");
    }

    #[test]
    fn test_failure_takes_precedence_over_partial_output() {
        let mut state = WritingState::new(WritingMode::Draft);
        state.input_text = "topic".into();
        let id = state.begin_generation().unwrap().session_id;
        state.apply(SessionEvent::new(id, SessionUpdate::Snapshot("Part".into())));
        state.apply(SessionEvent::new(id, SessionUpdate::Failed("try again".into())));

        assert_eq!(state.output_view(), OutputView::Error("try again"));
        assert!(!state.is_streaming());
        assert!(!state.can_copy());
    }

    #[test]
    fn test_new_generation_clears_previous_output() {
        let mut state = WritingState::new(WritingMode::Draft);
        state.input_text = "topic".into();
        let id = state.begin_generation().unwrap().session_id;
        state.apply(SessionEvent::new(id, SessionUpdate::Completed("old".into())));

        state.begin_generation().unwrap();
        assert_eq!(state.output_text(), "");
        assert_eq!(state.output_view(), OutputView::Thinking);
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let mut state = WritingState::new(WritingMode::Refine);
        state.input_text = "text".into();
        let first = state.begin_generation().unwrap().session_id;
        state.abandon();
        assert!(!state.is_streaming());

        let second = state.begin_generation().unwrap().session_id;
        assert!(!state.apply(SessionEvent::new(
            first,
            SessionUpdate::Completed("late".into())
        )));
        assert_eq!(state.output_text(), "");
        assert!(state.apply(SessionEvent::new(
            second,
            SessionUpdate::Snapshot("fresh".into())
        )));
        assert_eq!(state.output_text(), "fresh");
    }

    #[test]
    fn test_abandoned_partial_output_cannot_be_copied() {
        let mut state = WritingState::new(WritingMode::Draft);
        state.input_text = "topic".into();
        let id = state.begin_generation().unwrap().session_id;
        state.apply(SessionEvent::new(id, SessionUpdate::Snapshot("Half an ess".into())));
        state.abandon();

        assert!(!state.is_streaming());
        assert!(!state.can_copy());
        assert_eq!(
            state.output_view(),
            OutputView::Text {
                text: "Half an ess",
                streaming: false,
                complete: false,
            }
        );

        // the late completion belongs to the abandoned session
        assert!(!state.apply(SessionEvent::new(
            id,
            SessionUpdate::Completed("Half an essay.".into())
        )));
        assert!(!state.can_copy());
    }
}

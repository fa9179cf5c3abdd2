//! Composer - prompt registry and streaming generation for Augustus
//!
//! This crate provides:
//! - One prompt template per writing mode, plus sample inputs
//! - The dispatcher that streams a provider response as cumulative snapshots
//! - Per-call session tracking
//! - Editor state shared by any front end

pub mod dispatcher;
pub mod editor;
pub mod prompts;
pub mod session;

pub use dispatcher::{
    Dispatcher, GenerationFailure, GenerationRequest, FAILURE_MESSAGE, MAX_OUTPUT_TOKENS,
    TEMPERATURE,
};
pub use editor::{GenerationTicket, OutputView, SessionEvent, SessionUpdate, WritingState};
pub use prompts::{lookup, sample, PromptTemplate};
pub use session::{GenerationSession, SessionState};

//! Listing engine: remote service client and background call execution.
mod engine;
mod service;
mod types;
mod wire;

pub use engine::EngineHandle;
pub use service::{RemoteService, ReqwestService, ServiceSettings};
pub use types::{CallId, FailureKind, ServiceCall, ServiceError, ServiceEvent, ServiceOutcome};
pub use wire::{
    AskSuggestionBody, DeclineBody, HistoryBody, HistoryEntry, SubmitBody, SubmitReply,
    SuggestionId, SuggestionReply,
};

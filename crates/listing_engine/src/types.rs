use std::fmt;

use thiserror::Error;
use url::Url;

use crate::wire::{
    AskSuggestionBody, DeclineBody, HistoryBody, HistoryEntry, SubmitBody, SubmitReply,
    SuggestionReply,
};

/// Caller-chosen identifier echoed back with the call's completion.
pub type CallId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One outbound call to a named endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    AskSuggestion {
        id: CallId,
        url: Url,
        body: AskSuggestionBody,
    },
    Submit {
        id: CallId,
        url: Url,
        body: SubmitBody,
    },
    Decline {
        id: CallId,
        url: Url,
        body: DeclineBody,
    },
    History {
        id: CallId,
        url: Url,
        body: HistoryBody,
    },
}

impl ServiceCall {
    pub fn id(&self) -> CallId {
        match self {
            ServiceCall::AskSuggestion { id, .. }
            | ServiceCall::Submit { id, .. }
            | ServiceCall::Decline { id, .. }
            | ServiceCall::History { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOutcome {
    Suggestion(Result<SuggestionReply, ServiceError>),
    Submitted(Result<SubmitReply, ServiceError>),
    Declined(Result<(), ServiceError>),
    History(Result<Vec<HistoryEntry>, ServiceError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    Completed { id: CallId, outcome: ServiceOutcome },
}

//! Listing core: pure state machine for reviewing AI suggestions on product cards.
mod batch;
mod card;
mod effect;
mod error;
mod history;
mod keywords;
mod msg;
mod state;
mod tree;
mod update;
mod view_model;
mod workflow;

pub use batch::BatchRun;
pub use card::{Card, CardError, CardId, CardRegistry, Endpoints, FieldState, PromptType};
pub use effect::{Effect, SubmitOrigin, SubmitPayload};
pub use error::{FailureKind, Notification, NotificationLevel, ServiceFailure};
pub use history::{HistoryEntry, HistoryPopup};
pub use keywords::{KeywordAdd, KeywordHandle, KeywordSet};
pub use msg::{Msg, SuggestionReply};
pub use state::{AppState, CoreSettings};
pub use tree::{NodeId, PageTree};
pub use update::update;
pub use view_model::{AppViewModel, CardView, FieldView, HistoryPopupView, KeywordView};
pub use workflow::{FieldPhase, FieldStatus, RequestId, Suggestion, SuggestionId};

/// Inline message shown when a request needs keywords and the card has none.
pub const MISSING_KEYWORDS_MESSAGE: &str = update::MISSING_KEYWORDS;

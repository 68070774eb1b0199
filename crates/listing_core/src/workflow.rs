use std::fmt;

/// Identifier of an outbound service call, assigned by the core.
pub type RequestId = u64;

/// Opaque backend identifier used to accept or decline a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SuggestionId {
    Number(u64),
    Text(String),
}

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionId::Number(id) => write!(f, "{id}"),
            SuggestionId::Text(id) => f.write_str(id),
        }
    }
}

/// AI-proposed replacement value for a field, alive until accepted or declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub id: SuggestionId,
}

/// Lifecycle position of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldPhase {
    /// Showing committed text.
    #[default]
    Idle,
    /// A suggestion request is outstanding.
    Requesting { request: RequestId },
    /// A candidate is displayed; `original` is what decline restores.
    Pending {
        original: String,
        suggestion: Suggestion,
        accepting: Option<RequestId>,
    },
    /// The editable control is shown; `original` is what cancel restores.
    Editing {
        original: String,
        draft: String,
        submitting: Option<RequestId>,
    },
    /// A history entry is being saved as the field's value.
    Applying { request: RequestId },
}

/// Coarse status used by views and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStatus {
    #[default]
    Idle,
    Requesting,
    Pending,
    Editing,
    Applying,
}

impl FieldPhase {
    pub fn status(&self) -> FieldStatus {
        match self {
            FieldPhase::Idle => FieldStatus::Idle,
            FieldPhase::Requesting { .. } => FieldStatus::Requesting,
            FieldPhase::Pending { .. } => FieldStatus::Pending,
            FieldPhase::Editing { .. } => FieldStatus::Editing,
            FieldPhase::Applying { .. } => FieldStatus::Applying,
        }
    }

    /// True while a call issued for this field is in flight (loading indicator shown).
    pub fn is_busy(&self) -> bool {
        match self {
            FieldPhase::Idle => false,
            FieldPhase::Requesting { .. } | FieldPhase::Applying { .. } => true,
            FieldPhase::Pending { accepting, .. } => accepting.is_some(),
            FieldPhase::Editing { submitting, .. } => submitting.is_some(),
        }
    }

    /// The last committed value, given the text currently on display.
    pub fn committed_text<'a>(&'a self, displayed: &'a str) -> &'a str {
        match self {
            FieldPhase::Pending { original, .. } | FieldPhase::Editing { original, .. } => {
                original
            }
            FieldPhase::Idle | FieldPhase::Requesting { .. } | FieldPhase::Applying { .. } => {
                displayed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_tracks_outstanding_calls_only() {
        let suggestion = Suggestion {
            text: "new".into(),
            id: SuggestionId::Number(1),
        };
        assert!(!FieldPhase::Idle.is_busy());
        assert!(FieldPhase::Requesting { request: 1 }.is_busy());
        assert!(FieldPhase::Applying { request: 3 }.is_busy());
        assert!(!FieldPhase::Pending {
            original: "old".into(),
            suggestion: suggestion.clone(),
            accepting: None,
        }
        .is_busy());
        assert!(FieldPhase::Pending {
            original: "old".into(),
            suggestion,
            accepting: Some(2),
        }
        .is_busy());
    }

    #[test]
    fn committed_text_prefers_the_retained_original() {
        let editing = FieldPhase::Editing {
            original: "Old".into(),
            draft: "New".into(),
            submitting: None,
        };
        assert_eq!(editing.committed_text("Old"), "Old");
        assert_eq!(FieldPhase::Idle.committed_text("shown"), "shown");
    }
}

//! Text rendering of the view model for the console shell.
use std::fmt::Write;

use listing_core::{
    AppViewModel, CardView, FieldStatus, FieldView, HistoryPopupView, Notification,
    NotificationLevel,
};

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    for card in &view.cards {
        render_card(&mut out, card);
    }
    if let Some(popup) = &view.popup {
        render_popup(&mut out, popup);
    }
    for notification in &view.notifications {
        render_notification(&mut out, notification);
    }
    out
}

fn render_card(out: &mut String, card: &CardView) {
    let _ = writeln!(out, "== {} [{}]", card.name, card.id);
    let keywords: Vec<String> = card
        .keywords
        .iter()
        .map(|k| format!("{}:{}", k.handle.raw(), k.text))
        .collect();
    if keywords.is_empty() {
        let _ = writeln!(out, "   keywords: (none)");
    } else {
        let _ = writeln!(out, "   keywords: {}", keywords.join(", "));
    }
    if let Some(error) = &card.inline_error {
        let _ = writeln!(out, "   ! {error}");
    }
    for field in &card.fields {
        render_field(out, field);
    }
    if card.batch_running {
        let _ = writeln!(out, "   batch running...");
    }
    if card.bulk_review {
        let _ = writeln!(out, "   [accept-all] [decline-all]");
    }
}

fn render_field(out: &mut String, field: &FieldView) {
    let marker = if field.processed { "x" } else { " " };
    let status = match field.status {
        FieldStatus::Idle => "",
        FieldStatus::Requesting => " (requesting)",
        FieldStatus::Pending => " (suggestion: accept/decline)",
        FieldStatus::Editing => " (editing)",
        FieldStatus::Applying => " (applying history)",
    };
    let busy = if field.busy { " ..." } else { "" };
    let _ = writeln!(
        out,
        "   [{marker}] {}: {}{status}{busy}",
        field.prompt_type, field.text
    );
    if let Some(draft) = &field.draft {
        let _ = writeln!(out, "       draft: {draft}");
    }
}

fn render_popup(out: &mut String, popup: &HistoryPopupView) {
    let _ = writeln!(out, "-- {} --", popup.title);
    if popup.loading {
        let _ = writeln!(out, "   loading...");
        return;
    }
    if popup.rows.is_empty() {
        let _ = writeln!(out, "   No history yet");
    }
    for (index, row) in popup.rows.iter().enumerate() {
        let applying = if popup.applying_row == Some(index) {
            " ..."
        } else {
            ""
        };
        let _ = writeln!(out, "   {index}) {}{applying}", row.answer_text);
        if let Some(keywords) = &row.keywords {
            let _ = writeln!(out, "      keywords: {keywords}");
        }
    }
}

fn render_notification(out: &mut String, notification: &Notification) {
    let level = match notification.level {
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    };
    let _ = writeln!(out, "{level}: {}", notification.message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_core::{CardId, HistoryEntry, PromptType};

    fn card_view() -> CardView {
        CardView {
            id: CardId::new("p-1"),
            name: "Lamp".into(),
            keywords: Vec::new(),
            inline_error: Some("Add a keyword".into()),
            bulk_review: true,
            batch_running: false,
            fields: vec![FieldView {
                prompt_type: PromptType::Title,
                text: "Desk lamp".into(),
                processed: true,
                status: FieldStatus::Pending,
                busy: false,
                draft: None,
            }],
        }
    }

    #[test]
    fn card_shows_field_state_and_bulk_controls() {
        let view = AppViewModel {
            cards: vec![card_view()],
            ..AppViewModel::default()
        };
        let text = render(&view);
        assert!(text.contains("== Lamp [p-1]"));
        assert!(text.contains("keywords: (none)"));
        assert!(text.contains("! Add a keyword"));
        assert!(text.contains("[x] title: Desk lamp (suggestion: accept/decline)\n"));
        assert!(text.contains("[accept-all] [decline-all]"));
    }

    #[test]
    fn field_saving_a_history_entry_shows_as_busy() {
        let mut card = card_view();
        card.fields[0].status = FieldStatus::Applying;
        card.fields[0].busy = true;
        let view = AppViewModel {
            cards: vec![card],
            ..AppViewModel::default()
        };
        assert!(render(&view).contains("title: Desk lamp (applying history) ..."));
    }

    #[test]
    fn empty_history_shows_placeholder() {
        let view = AppViewModel {
            popup: Some(HistoryPopupView {
                card: CardId::new("p-1"),
                field: PromptType::Title,
                title: "History: title".into(),
                loading: false,
                rows: Vec::new(),
                applying_row: None,
            }),
            ..AppViewModel::default()
        };
        assert!(render(&view).contains("No history yet"));
    }

    #[test]
    fn history_rows_are_numbered_with_keywords() {
        let view = AppViewModel {
            popup: Some(HistoryPopupView {
                card: CardId::new("p-1"),
                field: PromptType::Title,
                title: "History: title".into(),
                loading: false,
                rows: vec![
                    HistoryEntry {
                        answer_text: "Old".into(),
                        keywords: Some("lamp".into()),
                    },
                    HistoryEntry {
                        answer_text: "Older".into(),
                        keywords: None,
                    },
                ],
                applying_row: Some(1),
            }),
            ..AppViewModel::default()
        };
        let text = render(&view);
        assert!(text.contains("0) Old"));
        assert!(text.contains("keywords: lamp"));
        assert!(text.contains("1) Older ..."));
    }
}

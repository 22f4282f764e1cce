// src/app/table/actions.rs
// Action Dispatcher: row, bulk and table actions. Builds the pending request, gates it
// behind confirmation, tracks it while in flight and interprets the server's answer.

use super::error::TableError;
use super::grid::{RefreshTicket, Row};
use super::i18n::{tr, Translator};
use super::notify::Toast;
use super::request::RequestId;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Display-only column the grid adds for row action buttons; never sent back.
pub const ACTIONS_COLUMN: &str = "actions";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RowAction {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub with_confirmation: bool,
}

impl RowAction {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BulkAction {
    #[serde(alias = "action")]
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableAction {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionTarget {
    Row(Row),
    Rows(Vec<Row>),
    Table,
}

/// An action the user triggered, from the click until its request resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub name: String,
    pub label: String,
    pub target: ActionTarget,
    pub needs_confirmation: bool,
}

impl PendingAction {
    /// Form fields of the POST.
    pub fn form(&self) -> Vec<(String, String)> {
        match &self.target {
            ActionTarget::Row(row) => vec![
                ("row_action".to_string(), self.name.clone()),
                ("row".to_string(), Value::Object(row.clone()).to_string()),
            ],
            ActionTarget::Rows(rows) => {
                let rows: Vec<Value> = rows.iter().cloned().map(Value::Object).collect();
                vec![
                    ("bulk_action".to_string(), self.name.clone()),
                    ("rows".to_string(), Value::Array(rows).to_string()),
                ]
            }
            ActionTarget::Table => vec![("table_action".to_string(), self.name.clone())],
        }
    }
}

/// `errors` arrives as a list, a single string or null depending on the action kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ErrorList {
    One(String),
    Many(Vec<Option<String>>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    errors: Option<ErrorList>,
    #[serde(default)]
    pub redirect: Option<String>,
}

impl ActionResponse {
    pub fn parse(body: &str) -> Result<Self, TableError> {
        serde_json::from_str(body).map_err(|e| TableError::Decode(e.to_string()))
    }

    pub fn errors(&self) -> Vec<String> {
        let errors = match &self.errors {
            None => Vec::new(),
            Some(ErrorList::One(e)) => vec![e.clone()],
            Some(ErrorList::Many(list)) => list.iter().flatten().cloned().collect(),
        };
        errors.into_iter().filter(|e| !e.is_empty()).collect()
    }
}

/// What the controller has to do once an action's response is in.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionEffect {
    Notify(Vec<Toast>),
    Navigate(String),
    RefreshThenNotify(Toast),
}

#[derive(Debug, Default)]
pub struct ActionDispatcher {
    row_actions: Vec<RowAction>,
    bulk_actions: Vec<BulkAction>,
    table_actions: Vec<TableAction>,
    awaiting_confirmation: Option<PendingAction>,
    in_flight: HashMap<RequestId, PendingAction>,
    after_refresh: Vec<(RefreshTicket, Toast)>,
}

impl ActionDispatcher {
    pub fn new(
        row_actions: Vec<RowAction>,
        bulk_actions: Vec<BulkAction>,
        table_actions: Vec<TableAction>,
    ) -> Self {
        Self {
            row_actions,
            bulk_actions,
            table_actions,
            ..Default::default()
        }
    }

    pub fn bulk_actions(&self) -> &[BulkAction] {
        &self.bulk_actions
    }

    pub fn table_actions(&self) -> &[TableAction] {
        &self.table_actions
    }

    pub fn prepare_row(&self, name: &str, row: Row) -> Option<PendingAction> {
        let Some(action) = self.row_actions.iter().find(|a| a.name == name) else {
            warn!("Row action '{}' is not configured", name);
            return None;
        };
        Some(PendingAction {
            name: action.name.clone(),
            label: action.label().to_string(),
            target: ActionTarget::Row(row),
            needs_confirmation: action.with_confirmation,
        })
    }

    /// `None` for an empty selection: nothing to send.
    pub fn prepare_bulk(&self, name: &str, rows: Vec<Row>) -> Option<PendingAction> {
        let Some(action) = self.bulk_actions.iter().find(|a| a.name == name) else {
            warn!("Bulk action '{}' is not configured", name);
            return None;
        };
        if rows.is_empty() {
            debug!("Bulk action '{}' ignored: no rows selected", name);
            return None;
        }
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.remove(ACTIONS_COLUMN);
                row
            })
            .collect();
        Some(PendingAction {
            name: action.name.clone(),
            label: action.label.clone(),
            target: ActionTarget::Rows(rows),
            needs_confirmation: true,
        })
    }

    pub fn prepare_table(&self, name: &str) -> Option<PendingAction> {
        let Some(action) = self.table_actions.iter().find(|a| a.name == name) else {
            warn!("Table action '{}' is not configured", name);
            return None;
        };
        Some(PendingAction {
            name: action.name.clone(),
            label: action.label.clone(),
            target: ActionTarget::Table,
            needs_confirmation: true,
        })
    }

    /// Holds the action until the user answers the prompt. A newer prompt replaces an
    /// unanswered one.
    pub fn await_confirmation(&mut self, pending: PendingAction) {
        self.awaiting_confirmation = Some(pending);
    }

    pub fn take_awaiting(&mut self) -> Option<PendingAction> {
        self.awaiting_confirmation.take()
    }

    pub fn track(&mut self, id: RequestId, pending: PendingAction) {
        self.in_flight.insert(id, pending);
    }

    pub fn finish(&mut self, id: RequestId) -> Option<PendingAction> {
        self.in_flight.remove(&id)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn confirmation_message(translator: &dyn Translator, pending: &PendingAction) -> String {
        tr(
            translator,
            "Are you sure you want to perform \"{label}\"?",
            &[("label", pending.label.as_str())],
        )
    }

    /// Maps a server answer to the effect the controller carries out.
    pub fn interpret(
        translator: &dyn Translator,
        pending: &PendingAction,
        response: &ActionResponse,
    ) -> ActionEffect {
        if !response.success {
            let errors = response.errors();
            let primary = errors
                .first()
                .cloned()
                .or_else(|| response.error.clone().filter(|e| !e.is_empty()))
                .unwrap_or_else(|| translator.gettext("Unknown error"));
            let mut toasts = vec![Toast::danger(primary)];
            if errors.len() > 1 {
                let more = (errors.len() - 1).to_string();
                toasts.push(Toast::warning(tr(
                    translator,
                    "{count} more errors were suppressed",
                    &[("count", more.as_str())],
                )));
            }
            return ActionEffect::Notify(toasts);
        }

        if let Some(redirect) = response.redirect.as_ref().filter(|r| !r.is_empty()) {
            return ActionEffect::Navigate(redirect.clone());
        }

        let message = response.message.clone().unwrap_or_else(|| {
            tr(
                translator,
                "Action \"{label}\" completed successfully",
                &[("label", pending.label.as_str())],
            )
        });
        ActionEffect::RefreshThenNotify(Toast::success(message))
    }

    /// Holds a toast until the grid reports the refresh behind `ticket` as loaded.
    pub fn notify_after_refresh(&mut self, ticket: RefreshTicket, toast: Toast) {
        self.after_refresh.push((ticket, toast));
    }

    /// Toasts whose refresh has completed. A later load also settles older tickets.
    pub fn release_after_refresh(&mut self, loaded: RefreshTicket) -> Vec<Toast> {
        let (ready, waiting): (Vec<_>, Vec<_>) = self
            .after_refresh
            .drain(..)
            .partition(|(ticket, _)| *ticket <= loaded);
        self.after_refresh = waiting;
        ready.into_iter().map(|(_, toast)| toast).collect()
    }

    /// Drops the toasts waiting on a refresh that failed; returns how many were dropped.
    pub fn abandon_after_refresh(&mut self, failed: RefreshTicket) -> usize {
        let before = self.after_refresh.len();
        self.after_refresh.retain(|(ticket, _)| *ticket != failed);
        before - self.after_refresh.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::table::i18n::Catalog;
    use crate::app::table::notify::ToastKind;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn dispatcher() -> ActionDispatcher {
        ActionDispatcher::new(
            vec![
                RowAction {
                    name: "edit".into(),
                    label: Some("Edit".into()),
                    icon: None,
                    with_confirmation: false,
                },
                RowAction {
                    name: "delete".into(),
                    label: Some("Delete".into()),
                    icon: Some("🗑".into()),
                    with_confirmation: true,
                },
            ],
            vec![BulkAction {
                name: "purge".into(),
                label: "Purge selected".into(),
            }],
            vec![TableAction {
                name: "rebuild".into(),
                label: "Rebuild index".into(),
            }],
        )
    }

    #[test]
    fn form_fields_per_kind() {
        let d = dispatcher();
        let r = d.prepare_row("edit", row(json!({"id": 1}))).unwrap();
        assert_eq!(
            r.form(),
            vec![
                ("row_action".to_string(), "edit".to_string()),
                ("row".to_string(), r#"{"id":1}"#.to_string()),
            ]
        );
        assert!(!r.needs_confirmation);

        let b = d
            .prepare_bulk("purge", vec![row(json!({"id": 1, "actions": "<a>"})), row(json!({"id": 2}))])
            .unwrap();
        assert_eq!(b.form()[1].1, r#"[{"id":1},{"id":2}]"#);
        assert!(b.needs_confirmation);

        let t = d.prepare_table("rebuild").unwrap();
        assert_eq!(t.form(), vec![("table_action".to_string(), "rebuild".to_string())]);
        assert!(t.needs_confirmation);
    }

    #[test]
    fn empty_selection_and_unknown_names_prepare_nothing() {
        let d = dispatcher();
        assert!(d.prepare_bulk("purge", Vec::new()).is_none());
        assert!(d.prepare_bulk("nope", vec![row(json!({"id": 1}))]).is_none());
        assert!(d.prepare_row("nope", Row::new()).is_none());
        assert!(d.prepare_table("nope").is_none());
    }

    #[test]
    fn errors_accept_every_shape() {
        let list = ActionResponse::parse(r#"{"success": false, "errors": ["a", null, "b"]}"#).unwrap();
        assert_eq!(list.errors(), vec!["a", "b"]);
        let single = ActionResponse::parse(r#"{"success": false, "errors": "boom"}"#).unwrap();
        assert_eq!(single.errors(), vec!["boom"]);
        let null = ActionResponse::parse(r#"{"success": true, "errors": null}"#).unwrap();
        assert!(null.errors().is_empty());
    }

    #[test]
    fn failure_with_two_errors_gives_two_notifications() {
        let d = dispatcher();
        let pending = d.prepare_table("rebuild").unwrap();
        let response = ActionResponse::parse(r#"{"success": false, "errors": ["a", "b"]}"#).unwrap();
        let ActionEffect::Notify(toasts) = ActionDispatcher::interpret(&Catalog::default(), &pending, &response) else {
            panic!("expected notifications");
        };
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].message, "a");
        assert_eq!(toasts[0].kind, ToastKind::Danger);
        assert_eq!(toasts[1].message, "1 more errors were suppressed");
    }

    #[test]
    fn failure_falls_back_to_error_then_unknown() {
        let d = dispatcher();
        let pending = d.prepare_table("rebuild").unwrap();
        let catalog = Catalog::default();
        let with_error = ActionResponse::parse(r#"{"success": false, "error": "denied"}"#).unwrap();
        assert_eq!(
            ActionDispatcher::interpret(&catalog, &pending, &with_error),
            ActionEffect::Notify(vec![Toast::danger("denied")])
        );
        let bare = ActionResponse::parse(r#"{"success": false}"#).unwrap();
        assert_eq!(
            ActionDispatcher::interpret(&catalog, &pending, &bare),
            ActionEffect::Notify(vec![Toast::danger("Unknown error")])
        );
    }

    #[test]
    fn success_redirects_or_refreshes() {
        let d = dispatcher();
        let pending = d.prepare_table("rebuild").unwrap();
        let catalog = Catalog::default();
        let redirect = ActionResponse::parse(r#"{"success": true, "redirect": "/x"}"#).unwrap();
        assert_eq!(
            ActionDispatcher::interpret(&catalog, &pending, &redirect),
            ActionEffect::Navigate("/x".into())
        );
        let plain = ActionResponse::parse(r#"{"success": true}"#).unwrap();
        assert_eq!(
            ActionDispatcher::interpret(&catalog, &pending, &plain),
            ActionEffect::RefreshThenNotify(Toast::success(
                "Action \"Rebuild index\" completed successfully"
            ))
        );
        let message = ActionResponse::parse(r#"{"success": true, "message": "Done"}"#).unwrap();
        assert_eq!(
            ActionDispatcher::interpret(&catalog, &pending, &message),
            ActionEffect::RefreshThenNotify(Toast::success("Done"))
        );
    }

    #[test]
    fn deferred_toasts_wait_for_their_ticket() {
        let mut d = dispatcher();
        d.notify_after_refresh(RefreshTicket(2), Toast::success("two"));
        d.notify_after_refresh(RefreshTicket(3), Toast::success("three"));
        assert!(d.release_after_refresh(RefreshTicket(1)).is_empty());
        assert_eq!(d.release_after_refresh(RefreshTicket(2)), vec![Toast::success("two")]);
        assert_eq!(d.release_after_refresh(RefreshTicket(5)), vec![Toast::success("three")]);
    }

    #[test]
    fn failed_refresh_drops_only_its_own_toasts() {
        let mut d = dispatcher();
        d.notify_after_refresh(RefreshTicket(2), Toast::success("two"));
        d.notify_after_refresh(RefreshTicket(3), Toast::success("three"));
        assert_eq!(d.abandon_after_refresh(RefreshTicket(2)), 1);
        assert_eq!(d.abandon_after_refresh(RefreshTicket(2)), 0);
        assert_eq!(d.release_after_refresh(RefreshTicket(3)), vec![Toast::success("three")]);
    }
}

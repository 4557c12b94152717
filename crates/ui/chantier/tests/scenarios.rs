//! End-to-end behavior of the form, table and request lifecycle.

mod common;

use std::sync::Arc;

use api::ApiError;
use chantier::{
    action::{Action, PopupResult},
    form::{FieldValue, Form, FormField, FormSchema, RawInput, REQUIRED_MESSAGE},
    pages::{Page, ResourcePage},
    resource::{Confirmation, DeleteOutcome, ResourceKind, ResourceLifecycle},
    table::{Column, PageItem, TableView},
    tui::{Event, EventResponse},
};
use common::{Call, MemoryBackend, materials, row};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

#[test]
fn required_field_blocks_submission() {
    let mut form = Form::new(
        "Add project",
        FormSchema::new(vec![FormField::text("nom", "Name").required()]),
    );
    form.open(Some(row(json!({"nom": ""}))));

    assert_eq!(form.submit(), None);
    assert_eq!(form.error("nom"), Some(REQUIRED_MESSAGE));

    form.change("nom", RawInput::Text("Villa Diop".into()));
    let submission = form.submit().unwrap();
    assert_eq!(submission.to_json(), json!({"nom": "Villa Diop"}));
    assert_eq!(form.error("nom"), None);
}

#[test]
fn first_page_of_twenty_three_rows() {
    let data: Vec<_> = materials(23).into_iter().map(row).collect();
    let columns = vec![Column::new("nom", "Name")];
    let mut view = TableView::new();
    let page = view.view(&data, &columns);

    assert_eq!(page.total_pages, 3);
    let names: Vec<&str> = page.rows.iter().map(|r| r["nom"].as_str().unwrap()).collect();
    assert_eq!(names, (1..=10).map(|i| format!("m{i:02}")).collect::<Vec<_>>());
    assert_eq!(
        page.window(),
        vec![PageItem::Page(1), PageItem::Page(2), PageItem::Page(3)]
    );
    assert_eq!(page.summary(), "Showing 1 to 10 of 23 results");
}

#[tokio::test]
async fn delete_needs_confirmation_and_refetches() {
    let api = Arc::new(MemoryBackend::with("/materiaux", materials(3)));
    let mut lifecycle =
        ResourceLifecycle::new(Arc::clone(&api), ResourceKind::Materials.def().endpoint);
    assert!(lifecycle.load().await);

    let request = lifecycle.request_delete(&lifecycle.data()[0].clone()).unwrap();
    assert_eq!(request.question(), "Delete m01?");

    let outcome = lifecycle.resolve_delete(request.clone(), Confirmation::No).await;
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert!(api.writes().is_empty());
    assert_eq!(lifecycle.data().len(), 3);

    let outcome = lifecycle.resolve_delete(request, Confirmation::Yes).await;
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(
        api.calls(),
        vec![
            Call::List("/materiaux".into()),
            Call::Delete("/materiaux".into(), "id01".into()),
            Call::List("/materiaux".into()),
        ]
    );
    assert_eq!(lifecycle.data().len(), 2);
    assert_eq!(lifecycle.error(), None);
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
    Event::Key(KeyEvent::new(code, modifiers))
}

fn emitted(response: Option<EventResponse<Action>>) -> Option<Action> {
    match response {
        Some(EventResponse::Stop(a)) | Some(EventResponse::Continue(a)) => Some(a),
        None => None,
    }
}

async fn deliver(page: &mut ResourcePage<MemoryBackend>, rx: &mut UnboundedReceiver<Action>) {
    let action = rx.recv().await.unwrap();
    page.update(action).unwrap();
}

#[tokio::test]
async fn failed_write_keeps_form_and_input() {
    let api = Arc::new(MemoryBackend::with("/materiaux", materials(1)));
    api.fail_writes(ApiError::Status {
        status: 409,
        message: "Duplicate name".into(),
    });
    let (tx, mut rx) = unbounded_channel();
    let mut page = ResourcePage::new(ResourceKind::Materials, Arc::clone(&api));
    page.register_action_handler(tx).unwrap();
    page.on_enter().unwrap();
    deliver(&mut page, &mut rx).await;

    page.handle_events(key(KeyCode::Char('a'), KeyModifiers::NONE))
        .unwrap();
    let form = page.form_mut().unwrap().form_mut();
    for (name, value) in [
        ("nom", "m01"),
        ("categorie", "ciment"),
        ("unite", "sac"),
        ("quantiteStock", "12"),
        ("quantiteMinimum", "5"),
        ("prix", "4500"),
    ] {
        assert!(form.change(name, RawInput::Text(value.into())), "{name}");
    }

    let submitted = emitted(
        page.handle_events(key(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap(),
    )
    .unwrap();
    assert!(matches!(submitted, Action::FormSubmitted(_)));
    page.update(submitted).unwrap();
    deliver(&mut page, &mut rx).await;

    assert_eq!(
        page.banner(),
        Some("Unable to save the material. Please check the data.")
    );
    let form = page.form().unwrap().form();
    assert!(!form.is_submitting());
    assert_eq!(form.value("nom"), Some(&FieldValue::text("m01")));
    assert_eq!(form.value("quantiteStock").and_then(FieldValue::as_f64), Some(12.0));
    assert_eq!(api.writes(), vec![Call::Create("/materiaux".into())]);
    assert_eq!(page.table().data().len(), 1);
}

#[tokio::test]
async fn cancelled_delete_from_the_page_sends_nothing() {
    let api = Arc::new(MemoryBackend::with("/materiaux", materials(2)));
    let (tx, mut rx) = unbounded_channel();
    let mut page = ResourcePage::new(ResourceKind::Materials, Arc::clone(&api));
    page.register_action_handler(tx).unwrap();
    page.on_enter().unwrap();
    deliver(&mut page, &mut rx).await;

    page.handle_events(key(KeyCode::Down, KeyModifiers::NONE)).unwrap();
    page.handle_events(key(KeyCode::Char('d'), KeyModifiers::NONE)).unwrap();
    assert!(page.pending_delete().is_some());
    page.update(Action::PopupResult(PopupResult::Cancelled)).unwrap();

    assert!(page.pending_delete().is_none());
    assert!(api.writes().is_empty());
    assert_eq!(page.table().data().len(), 2);
}

#[tokio::test]
async fn failed_reload_keeps_previous_rows() {
    let api = Arc::new(MemoryBackend::with("/materiaux", materials(4)));
    let (tx, mut rx) = unbounded_channel();
    let mut page = ResourcePage::new(ResourceKind::Materials, Arc::clone(&api));
    page.register_action_handler(tx).unwrap();
    page.on_enter().unwrap();
    deliver(&mut page, &mut rx).await;

    api.fail_reads(ApiError::Transport("connection refused".into()));
    page.update(Action::Refresh).unwrap();
    deliver(&mut page, &mut rx).await;

    assert_eq!(page.table().data().len(), 4);
    assert!(!page.table().is_loading());
    assert_eq!(
        page.banner(),
        Some("Unable to load materials. Please try again later.")
    );
}

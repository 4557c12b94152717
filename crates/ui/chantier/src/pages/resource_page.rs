use std::sync::Arc;

use api::ResourceApi;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::{
    action::{Action, PopupResult, ResourceEvent},
    components::{Banner, Component, ConfirmPopup, render_backdrop},
    form::{FormPopup, Submission},
    resource::{
        CollectionState, DeleteOutcome, DeleteRequest, LookupOptions, ResourceDef, ResourceKind,
        Row, SaveOutcome, WriteTarget, fetch, load_lookup, remove, write,
    },
    table::{ResourceTable, TableEvent, TableResponse},
    tui::{Event, EventResponse, Frame},
};

use super::Page;

/// List, create, edit and delete one resource.
///
/// Backend calls run on spawned tasks; their results come back as
/// `Action::Resource(kind, ..)` and are applied in [`Page::update`], even
/// when the page is not the active one.
pub struct ResourcePage<A: ResourceApi> {
    def: ResourceDef,
    api: Arc<A>,
    action_tx: Option<UnboundedSender<Action>>,
    table: ResourceTable,
    banner: Banner,
    state: CollectionState,
    lookups: LookupOptions,
    form: Option<(FormPopup, WriteTarget)>,
    confirm: Option<(ConfirmPopup, DeleteRequest)>,
    mounted: bool,
}

impl<A: ResourceApi> ResourcePage<A> {
    pub fn new(kind: ResourceKind, api: Arc<A>) -> Self {
        let def = kind.def();
        let mut table = ResourceTable::new(
            format!("{} list", capitalize(def.plural)),
            def.columns(),
        )
        .no_data_message(def.no_data_message);
        if def.deletable {
            table = table.with_delete();
        }
        Self {
            def,
            api,
            action_tx: None,
            table,
            banner: Banner::default(),
            state: CollectionState::default(),
            lookups: LookupOptions::new(),
            form: None,
            confirm: None,
            mounted: false,
        }
    }

    pub fn def(&self) -> &ResourceDef {
        &self.def
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    pub fn table(&self) -> &ResourceTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ResourceTable {
        &mut self.table
    }

    pub fn form(&self) -> Option<&FormPopup> {
        self.form.as_ref().map(|(popup, _)| popup)
    }

    pub fn form_mut(&mut self) -> Option<&mut FormPopup> {
        self.form.as_mut().map(|(popup, _)| popup)
    }

    pub fn pending_delete(&self) -> Option<&DeleteRequest> {
        self.confirm.as_ref().map(|(_, request)| request)
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.message()
    }

    pub fn lookups(&self) -> &LookupOptions {
        &self.lookups
    }

    /// Issue a list read, plus the reference lookups of the form.
    pub fn load(&mut self) {
        self.state.begin_load();
        self.table.set_loading(true);
        self.banner.set(None);

        let Some(tx) = self.action_tx.clone() else {
            warn!(resource = %self.def.kind, "load requested before action handler registration");
            return;
        };
        let kind = self.def.kind;
        let api = Arc::clone(&self.api);
        let endpoint = self.def.endpoint.clone();
        tokio::spawn(async move {
            let result = fetch(api.as_ref(), &endpoint).await;
            tx.send(Action::Resource(kind, ResourceEvent::Loaded(result))).ok();
        });

        for lookup in self.def.lookups.clone() {
            let Some(tx) = self.action_tx.clone() else {
                break;
            };
            let api = Arc::clone(&self.api);
            tokio::spawn(async move {
                let result = load_lookup(api.as_ref(), &lookup).await;
                tx.send(Action::Resource(
                    kind,
                    ResourceEvent::LookupLoaded {
                        field: lookup.field,
                        result,
                    },
                ))
                .ok();
            });
        }
    }

    fn open_form(&mut self, title: String, initial: Row, target: WriteTarget) {
        let schema = self.def.form_schema(&self.lookups);
        debug!(resource = %self.def.kind, ?target, "opening form");
        self.form = Some((FormPopup::new(title, schema).open(Some(initial)), target));
    }

    fn on_table_event(&mut self, event: TableEvent) {
        match event {
            TableEvent::Add => {
                self.open_form(self.def.add_title(), self.def.defaults(), WriteTarget::Create);
            }
            TableEvent::Edit(row) => match self.def.endpoint.row_id(&row) {
                Some(id) => {
                    let title = self.def.edit_title(&row);
                    self.open_form(title, row, WriteTarget::Update(id));
                }
                None => warn!(resource = %self.def.kind, "row without identifier, cannot edit"),
            },
            TableEvent::Delete(row) => {
                if !self.def.deletable {
                    return;
                }
                let Some(id) = self.def.endpoint.row_id(&row) else {
                    warn!(resource = %self.def.kind, "row without identifier, cannot delete");
                    return;
                };
                let request = DeleteRequest {
                    id,
                    name: self.def.endpoint.row_name(&row),
                };
                let popup = ConfirmPopup::new("Confirm", request.question())
                    .ok_label("Delete")
                    .cancel_label("Keep");
                self.confirm = Some((popup, request));
            }
        }
    }

    fn submit(&mut self, submission: Submission) {
        let Some((popup, target)) = self.form.as_mut() else {
            return;
        };
        if !self.state.begin_submit() {
            return;
        }
        popup.set_submitting(true);
        self.banner.set(None);

        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let kind = self.def.kind;
        let api = Arc::clone(&self.api);
        let endpoint = self.def.endpoint.clone();
        let target = target.clone();
        let body = endpoint.body(&submission);
        tokio::spawn(async move {
            let result = write(api.as_ref(), &endpoint, &target, body).await;
            tx.send(Action::Resource(kind, ResourceEvent::Saved(result))).ok();
        });
    }

    fn resolve_delete(&mut self, result: PopupResult) {
        let Some((_, request)) = self.confirm.take() else {
            return;
        };
        if result == PopupResult::Cancelled {
            debug!(resource = %self.def.kind, id = %request.id, "delete cancelled");
            return;
        }
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let kind = self.def.kind;
        let api = Arc::clone(&self.api);
        let endpoint = self.def.endpoint.clone();
        tokio::spawn(async move {
            let result = remove(api.as_ref(), &endpoint, &request.id).await;
            tx.send(Action::Resource(kind, ResourceEvent::Deleted(result))).ok();
        });
    }

    fn apply(&mut self, event: ResourceEvent) {
        let messages = self.def.endpoint.messages.clone();
        match event {
            ResourceEvent::Loaded(result) => {
                if self.state.finish_load(result, &messages) {
                    self.table.set_data(self.state.data.clone());
                }
                self.table.set_loading(false);
            }
            ResourceEvent::Saved(result) => {
                match self.state.finish_submit(result, &messages) {
                    SaveOutcome::Saved => {
                        self.form = None;
                        self.load();
                    }
                    SaveOutcome::Failed | SaveOutcome::Busy => {
                        if let Some(popup) = self.form_mut() {
                            popup.set_submitting(false);
                        }
                    }
                }
            }
            ResourceEvent::Deleted(result) => {
                if self.state.finish_delete(result, &messages) == DeleteOutcome::Deleted {
                    self.load();
                }
            }
            ResourceEvent::LookupLoaded { field, result } => match result {
                Ok(options) => {
                    self.lookups.insert(field, options);
                }
                Err(err) => {
                    warn!(resource = %self.def.kind, %field, error = %err, "lookup failed");
                }
            },
        }
        self.banner.set(self.state.error.clone());
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        if let Some((popup, _)) = self.confirm.as_mut() {
            return popup.handle_key_events(key);
        }
        if let Some((popup, _)) = self.form.as_mut() {
            return popup.handle_key_events(key);
        }
        match self.table.handle_key(key) {
            TableResponse::Event(event) => {
                self.on_table_event(event);
                Ok(Some(EventResponse::Stop(Action::Update)))
            }
            TableResponse::Handled => Ok(Some(EventResponse::Stop(Action::Update))),
            TableResponse::Ignored => match (key.code, key.modifiers) {
                (KeyCode::Char('r'), KeyModifiers::NONE) | (KeyCode::F(5), _) => {
                    Ok(Some(EventResponse::Stop(Action::Refresh)))
                }
                _ => Ok(None),
            },
        }
    }
}

impl<A: ResourceApi> Page for ResourcePage<A> {
    fn name(&self) -> &str {
        self.def.plural
    }

    fn resource(&self) -> Option<ResourceKind> {
        Some(self.def.kind)
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn keymap_context(&self) -> &'static str {
        if self.confirm.is_some() {
            "confirm"
        } else if self.form.is_some() {
            "form"
        } else if self.table.is_searching() {
            "search"
        } else {
            "table"
        }
    }

    fn captures_input(&self) -> bool {
        self.confirm.is_some() || self.form.is_some() || self.table.is_searching()
    }

    fn handle_events(&mut self, event: Event) -> Result<Option<EventResponse<Action>>> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) if self.table.is_searching() => {
                let term = format!("{}{}", self.table.view().search(), text);
                self.table.set_search(&term);
                Ok(Some(EventResponse::Stop(Action::Update)))
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.table.tick(),
            Action::Refresh => self.load(),
            Action::Resource(kind, event) if kind == self.def.kind => self.apply(event),
            Action::FormSubmitted(submission) => self.submit(submission),
            Action::FormCancelled => {
                if self.form.as_ref().is_some_and(|(p, _)| !p.form().is_submitting()) {
                    self.form = None;
                }
            }
            Action::PopupResult(result) => self.resolve_delete(result),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [banner_area, table_area] =
            Layout::vertical([self.banner.height_constraint(), Constraint::Fill(1)]).areas(area);
        self.banner.draw(frame, banner_area)?;
        self.table.draw(frame, table_area)?;

        if let Some((popup, _)) = self.form.as_mut() {
            render_backdrop(frame, area);
            popup.draw(frame, area)?;
        }
        if let Some((popup, _)) = self.confirm.as_mut() {
            render_backdrop(frame, area);
            popup.draw(frame, area)?;
        }
        Ok(())
    }

    fn on_enter(&mut self) -> Result<()> {
        if !self.mounted {
            self.mounted = true;
            self.load();
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

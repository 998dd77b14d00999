//! Application shell: owns the list, the form, and the router, and switches
//! between list, add and edit modes.

use crate::Result;
use crate::collection::{PersonList, SaveError};
use crate::diagnostics;
use crate::events::Event;
use crate::form::PersonForm;
use crate::model::Person;
use crate::router::{Route, Router};
use crate::store::Store;

use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    Add,
    Edit,
}

pub struct App<S: Store> {
    store: S,
    people: PersonList,
    form: PersonForm,
    router: Router,
    mode: Mode,
    /// Id of the record inserted by the add flow in progress.
    pending_add: Option<String>,
}

impl<S: Store> App<S> {
    /// Load the collection from `store` and show the list.
    pub fn start(store: S, namespace: &str) -> Result<Self> {
        let mut people = PersonList::new(namespace);
        people.fetch(&store).with_context(|| {
            diagnostics::error_message(format!("cannot load namespace '{}'", namespace))
        })?;

        let mut app = Self {
            store,
            people,
            form: PersonForm::new(),
            router: Router::new(),
            mode: Mode::List,
            pending_add: None,
        };
        app.list();
        Ok(app)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn people(&self) -> &PersonList {
        &self.people
    }

    pub fn form(&self) -> &PersonForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PersonForm {
        &mut self.form
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dispatch(&mut self, route: Route) {
        match route {
            Route::Add => {
                self.add();
            }
            Route::Edit(id) => {
                self.edit(&id);
            }
            Route::List => self.list(),
        }
    }

    /// Start adding a person. The new, unsaved record joins the list right
    /// away; cancelling removes it again. Returns its id.
    pub fn add(&mut self) -> String {
        self.discard_pending();
        self.mode = Mode::Add;
        let id = self.people.add(Person::default());
        if let Some(person) = self.people.get(&id) {
            self.form.set_model(person.clone());
        }
        self.pending_add = Some(id.clone());
        self.router.navigate(Route::Add.fragment());
        self.pump();
        id
    }

    /// Start editing `id`. An unknown id shows the list instead.
    pub fn edit(&mut self, id: &str) -> bool {
        if self.pending_add.as_deref() != Some(id) {
            self.discard_pending();
        }
        self.mode = Mode::Edit;
        match self.people.get(id) {
            Some(person) => {
                self.form.set_model(person.clone());
                self.router.navigate(Route::Edit(id.to_string()).fragment());
                true
            }
            None => {
                tracing::debug!(%id, "no such person, showing the list");
                self.list();
                false
            }
        }
    }

    /// Show the list. An add flow still in progress is abandoned.
    pub fn list(&mut self) {
        self.discard_pending();
        self.mode = Mode::List;
        self.router.navigate(Route::List.fragment());
    }

    pub fn next(&mut self) -> bool {
        let moved = self.form.next();
        self.pump();
        moved
    }

    pub fn back(&mut self) {
        self.form.back();
        self.pump();
    }

    pub fn cancel(&mut self) {
        self.form.cancel();
        self.pump();
    }

    pub fn complete(&mut self) -> std::result::Result<Person, SaveError> {
        let saved = self.form.complete(&mut self.people, &mut self.store);
        self.pump();
        saved
    }

    /// Ask the list to edit `id`, as a row's edit button would.
    pub fn request_edit(&mut self, id: &str) {
        self.people.request_edit(id);
        self.pump();
    }

    pub fn destroy(&mut self, id: &str) -> Result<Option<Person>> {
        let removed = self
            .people
            .destroy(id, &mut self.store)
            .with_context(|| diagnostics::error_message(format!("cannot delete {}", id)))?;
        self.pump();
        Ok(removed)
    }

    /// Drain queued events until nothing new is produced.
    fn pump(&mut self) {
        loop {
            let mut events = self.form.drain_events();
            events.extend(self.people.drain_events());
            if events.is_empty() {
                break;
            }
            for event in events {
                self.handle(event);
            }
        }
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::FormComplete(person) => {
                tracing::info!(id = person.id.as_deref().unwrap_or(""), "saved {}", person.full_name());
                self.pending_add = None;
                self.list();
            }
            Event::FormCancel(_) => self.on_cancel(),
            Event::Edit(id) => {
                self.edit(&id);
            }
            Event::FormError(message) => {
                tracing::debug!(%message, "form error");
            }
            other => tracing::trace!(event = other.name(), "event"),
        }
    }

    fn on_cancel(&mut self) {
        self.form.clear_model();
        self.list();
    }

    /// Remove the unsaved record of an add flow that was left unfinished.
    fn discard_pending(&mut self) {
        let Some(id) = self.pending_add.take() else {
            return;
        };
        if let Err(e) = self.people.destroy(&id, &mut self.store) {
            diagnostics::warn(format!("cannot discard unsaved person {}: {}", id, e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::PEOPLE_NAMESPACE;
    use crate::form::Page;
    use crate::model::{into_attributes, Record};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn seeded() -> App<MemoryStore> {
        let mut store = MemoryStore::new();
        let doc = json!({
            "id": "ada",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "address": {
                "addressOne": "1 Main St",
                "addressTwo": "",
                "city": "Springfield",
                "state": "IL",
                "zipCode": "62701"
            }
        });
        store
            .save(PEOPLE_NAMESPACE, "ada", into_attributes(doc).unwrap())
            .unwrap();
        App::start(store, PEOPLE_NAMESPACE).unwrap()
    }

    #[test]
    fn starts_on_the_list() {
        let app = seeded();
        assert_eq!(app.mode(), Mode::List);
        assert_eq!(app.people().len(), 1);
        assert_eq!(app.router().current_route(), Route::List);
    }

    #[test]
    fn cancelled_add_leaves_no_trace() {
        let mut app = seeded();
        app.add();
        assert_eq!(app.mode(), Mode::Add);
        assert_eq!(app.people().len(), 2);
        assert_eq!(app.router().current(), "add");

        app.form_mut().blur("firstName", "Grace").unwrap();
        app.cancel();

        assert_eq!(app.mode(), Mode::List);
        assert_eq!(app.people().len(), 1);
        assert_eq!(app.store().len(PEOPLE_NAMESPACE), 1);
        assert!(app.form().draft().is_none());
        assert_eq!(app.router().current(), "");
    }

    #[test]
    fn second_add_replaces_the_unfinished_one() {
        let mut app = seeded();
        let first = app.add();
        app.dispatch(Route::Add);

        assert_eq!(app.people().len(), 2);
        assert!(!app.people().contains(&first));
        assert_eq!(app.mode(), Mode::Add);

        app.cancel();
        assert_eq!(app.people().len(), 1);
    }

    #[test]
    fn leaving_an_add_for_another_route_drops_the_unsaved_record() {
        let mut app = seeded();
        app.add();
        app.dispatch(Route::parse("edit/ada"));
        assert_eq!(app.people().len(), 1);
        assert_eq!(app.mode(), Mode::Edit);

        app.add();
        app.dispatch(Route::List);
        assert_eq!(app.people().len(), 1);
    }

    #[test]
    fn blocked_next_keeps_add_flow_on_first_page() {
        let mut app = seeded();
        app.add();
        assert!(!app.next());
        assert_eq!(app.form().page(), Page::Person);
        assert_eq!(app.mode(), Mode::Add);
    }

    #[test]
    fn completed_add_is_persisted() {
        let mut app = seeded();
        let id = app.add();
        app.form_mut().blur("firstName", "Grace").unwrap();
        app.form_mut().blur("lastName", "Hopper").unwrap();
        assert!(app.next());
        app.form_mut().blur("address.addressOne", "2 Elm St").unwrap();

        let saved = app.complete().unwrap();
        assert_eq!(saved.id(), Some(id.as_str()));
        assert_eq!(app.mode(), Mode::List);
        assert_eq!(app.people().len(), 2);
        assert_eq!(app.store().len(PEOPLE_NAMESPACE), 2);
        assert_eq!(app.form().page(), Page::Person);
    }

    #[test]
    fn edit_of_unknown_id_shows_the_list() {
        let mut app = seeded();
        assert!(!app.edit("nobody"));
        assert_eq!(app.mode(), Mode::List);
        assert_eq!(app.router().current_route(), Route::List);
    }

    #[test]
    fn edit_routes_and_loads_the_form() {
        let mut app = seeded();
        app.dispatch(Route::parse("edit/ada"));
        assert_eq!(app.mode(), Mode::Edit);
        assert_eq!(app.router().current(), "edit/ada");
        assert_eq!(app.form().input_value("address.city"), "Springfield");
    }

    #[test]
    fn cancelled_edit_keeps_the_record() {
        let mut app = seeded();
        app.request_edit("ada");
        app.form_mut().blur("firstName", "Augusta").unwrap();
        app.cancel();

        assert_eq!(app.people().len(), 1);
        assert_eq!(app.people().get("ada").map(|p| p.first_name.as_str()), Some("Ada"));
    }

    #[test]
    fn failed_edit_save_stays_in_the_form() {
        let mut app = seeded();
        app.edit("ada");
        app.next();
        app.form_mut().blur("address.zipCode", "12").unwrap();

        assert!(app.complete().is_err());
        assert_eq!(app.mode(), Mode::Edit);
        assert_eq!(app.form().input_value("address.zipCode"), "12");
        assert_eq!(
            app.people().get("ada").map(|p| p.calculated_address()),
            Some("1 Main St, Springfield, IL, 62701".to_string())
        );
    }

    #[test]
    fn person_stored_without_address_can_be_repaired() {
        let mut store = MemoryStore::new();
        let doc = json!({ "id": "n", "firstName": "Null", "lastName": "Address", "address": null });
        store
            .save(PEOPLE_NAMESPACE, "n", into_attributes(doc).unwrap())
            .unwrap();
        let mut app = App::start(store, PEOPLE_NAMESPACE).unwrap();

        assert!(app.edit("n"));
        assert!(app.next());
        app.form_mut().blur("address.addressOne", "3 Oak St").unwrap();

        let saved = app.complete().unwrap();
        assert_eq!(saved.calculated_address(), "3 Oak St");
        assert_eq!(app.mode(), Mode::List);
        assert_eq!(
            app.store()
                .find(PEOPLE_NAMESPACE, "n")
                .unwrap()
                .and_then(|doc| doc.get("address").cloned()),
            Some(json!({
                "addressOne": "3 Oak St",
                "addressTwo": "",
                "city": "",
                "state": "",
                "zipCode": ""
            }))
        );
    }

    #[test]
    fn destroy_removes_everywhere() {
        let mut app = seeded();
        assert!(app.destroy("ada").unwrap().is_some());
        assert!(app.people().is_empty());
        assert_eq!(app.store().len(PEOPLE_NAMESPACE), 0);
    }
}

//! Notifications passed from the collection and the form to the app shell.
//!
//! Producers queue events; the shell drains and reacts to them, so control
//! only ever flows one way.

use crate::form::Page;
use crate::model::Person;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A record joined the collection.
    Add(String),
    /// A record left the collection (and its store).
    Remove(String),
    /// A record asked to be edited.
    Edit(String),
    /// A saved record's attributes changed.
    Change(String),
    FormNext(Page),
    FormBack(Page),
    FormCancel(Page),
    FormComplete(Box<Person>),
    FormError(String),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Add(_) => "add",
            Event::Remove(_) => "remove",
            Event::Edit(_) => "edit",
            Event::Change(_) => "change",
            Event::FormNext(_) => "form:next",
            Event::FormBack(_) => "form:back",
            Event::FormCancel(_) => "form:cancel",
            Event::FormComplete(_) => "form:complete",
            Event::FormError(_) => "form:error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_match_the_event_set() {
        let names: Vec<&str> = [
            Event::Add("a".into()),
            Event::Remove("a".into()),
            Event::Edit("a".into()),
            Event::Change("a".into()),
            Event::FormNext(Page::Address),
            Event::FormBack(Page::Person),
            Event::FormCancel(Page::Person),
            Event::FormComplete(Box::default()),
            Event::FormError("boom".into()),
        ]
        .iter()
        .map(Event::name)
        .collect();

        assert_eq!(
            names,
            vec![
                "add",
                "remove",
                "edit",
                "change",
                "form:next",
                "form:back",
                "form:cancel",
                "form:complete",
                "form:error",
            ]
        );
    }
}

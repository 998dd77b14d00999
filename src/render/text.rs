use crate::collection::PersonList;
use crate::form::{Page, PersonForm};

use std::fmt::Write;

const EMPTY_LIST: &str = "No people yet.";

/// One row per person: id, full name and the one-line address.
pub fn render_list(people: &PersonList) -> String {
    if people.is_empty() {
        return format!("{}\n", EMPTY_LIST);
    }

    let rows: Vec<[String; 3]> = people
        .iter()
        .map(|p| {
            [
                p.id.clone().unwrap_or_default(),
                p.full_name(),
                p.calculated_address(),
            ]
        })
        .collect();

    // Padding counts chars, so widths must too.
    let width = |col: usize| rows.iter().map(|r| r[col].chars().count()).max().unwrap_or(0);
    let id_w = width(0).max(2);
    let name_w = width(1).max(4);

    let mut out = String::new();
    let _ = writeln!(out, "{:id_w$}  {:name_w$}  ADDRESS", "ID", "NAME");
    for [id, name, address] in &rows {
        let _ = writeln!(out, "{:id_w$}  {:name_w$}  {}", id, name, address);
    }
    out
}

/// Inputs of the current page with their values and any field errors.
pub fn render_form(form: &PersonForm) -> String {
    let title = match form.page() {
        Page::Person => "Person details",
        Page::Address => "Address",
    };

    let mut out = String::new();
    let _ = writeln!(out, "Page {} of 2: {}", form.page().index() + 1, title);

    let label_w = form.page().inputs().iter().map(|i| label(i).len()).max().unwrap_or(0);
    for input in form.page().inputs() {
        let _ = writeln!(
            out,
            "  {:label_w$} : {}",
            label(input),
            form.input_value(input)
        );
        if let Some(message) = form.field_error(input) {
            let _ = writeln!(out, "  {:label_w$}   ! {}", "", message);
        }
    }
    out
}

/// Display label of an input: the attribute name without its record path.
fn label(input: &str) -> &str {
    input.rsplit('.').next().unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::PEOPLE_NAMESPACE;
    use crate::model::{Person, Record, into_attributes};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_list_says_so() {
        assert_eq!(render_list(&PersonList::new(PEOPLE_NAMESPACE)), "No people yet.\n");
    }

    #[test]
    fn rows_show_name_and_calculated_address() {
        let mut people = PersonList::new(PEOPLE_NAMESPACE);
        people.add(
            Person::hydrate(
                into_attributes(json!({
                    "id": "a1",
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "address": { "addressOne": "1 Main St", "city": "Springfield", "state": "IL", "zipCode": "62701" }
                }))
                .unwrap(),
            )
            .unwrap(),
        );

        assert_eq!(
            render_list(&people),
            "ID  NAME          ADDRESS\n\
             a1  Ada Lovelace  1 Main St, Springfield, IL, 62701\n"
        );
    }

    #[test]
    fn columns_line_up_with_non_ascii_names() {
        let mut people = PersonList::new(PEOPLE_NAMESPACE);
        for (id, first, last) in [("z1", "Zoë", "Brontë"), ("a2", "Al", "Bo")] {
            people.add(
                Person::hydrate(
                    into_attributes(json!({
                        "id": id,
                        "firstName": first,
                        "lastName": last,
                        "address": { "addressOne": "1 Main St" }
                    }))
                    .unwrap(),
                )
                .unwrap(),
            );
        }

        assert_eq!(
            render_list(&people),
            "ID  NAME        ADDRESS\n\
             z1  Zoë Brontë  1 Main St\n\
             a2  Al Bo       1 Main St\n"
        );
    }

    #[test]
    fn form_shows_field_errors_under_inputs() {
        let mut form = PersonForm::new();
        form.set_model(Person::default());
        form.blur("firstName", "Ada").unwrap();
        form.next();

        assert_eq!(
            render_form(&form),
            "Page 1 of 2: Person details\n\
             \x20 firstName : Ada\n\
             \x20 lastName  : \n\
             \x20             ! The last name is required\n"
        );
    }

    #[test]
    fn labels_drop_the_record_path() {
        assert_eq!(label("address.zipCode"), "zipCode");
        assert_eq!(label("firstName"), "firstName");
    }
}
